fn main() {
    // The ESP-IDF build system only applies when cross-compiling for the
    // device; host builds (unit tests) must skip it
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") {
            embuild::espidf::sysenv::output();
        }
    }
}
