fn main() {
    // Askama compiles templates into the binary; cargo watches the directory
    // recursively.
    println!("cargo:rerun-if-changed=templates");
}
