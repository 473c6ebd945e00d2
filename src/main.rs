fn main() {
    plo_equity::cli::run();
}
