fn main() {
    if let Err(err) = leafcoco::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
