fn main() {
    if let Err(err) = identity_graph_engine::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
