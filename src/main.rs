fn main() {
    if let Err(err) = qrart_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
