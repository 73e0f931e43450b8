use std::env;
use std::process::Command;

fn have_frat_rs() -> bool {
    if env::var("RESIN_HAVE_FRAT_RS").is_ok() {
        return true;
    }
    Command::new("frat-rs").output().is_ok()
}

fn main() {
    println!("cargo::rustc-check-cfg=cfg(test_frat_rs)");
    println!("cargo::rerun-if-env-changed=RESIN_HAVE_FRAT_RS");
    if have_frat_rs() {
        println!("cargo::rustc-cfg=test_frat_rs");
    } else {
        println!("cargo:warning=frat-rs utility not found, proof checking tests will be disabled");
    }
}
