use soho_diagnosis_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("diagnosis service error: {err}");
        std::process::exit(1);
    }
}
