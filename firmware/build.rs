fn main() {
    embuild::espidf::sysenv::output();

    // Song selection is baked in at build time from .env
    println!("cargo::rerun-if-changed=.env");
    if let Ok(iter) = dotenvy::dotenv_iter() {
        for (key, val) in iter.flatten() {
            if key.starts_with("RTTTL_") {
                println!("cargo::rustc-env={}={}", key, val);
            }
        }
    }
}
