use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=PYEMBED_PYTHON_LIB");
    println!("cargo:rerun-if-env-changed=PYEMBED_PYTHON_LIB_DIR");

    // Nothing to link unless the runtime entry points are declared.
    if env::var_os("CARGO_FEATURE_LINK_PYTHON").is_none() {
        return;
    }

    let lib = env::var("PYEMBED_PYTHON_LIB").unwrap_or_else(|_| "python3".to_string());
    if let Ok(dir) = env::var("PYEMBED_PYTHON_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    println!("cargo:rustc-link-lib={}", lib);
}
