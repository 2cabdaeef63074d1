fn main() {
    // Only the ESP-IDF build needs the sysenv passthrough; host builds
    // (tests, property tests) compile without embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
