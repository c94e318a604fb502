fn main() {
    shape_linker::run();
}
