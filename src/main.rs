fn main() {
    if let Err(err) = basket_miner::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
