fn main() {
    if let Err(err) = ree_flow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
