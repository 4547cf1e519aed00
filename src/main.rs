fn main() {
    if let Err(err) = pharma_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
