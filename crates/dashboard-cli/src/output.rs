use serde::Serialize;

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Envelope around every JSON document the CLI prints.
#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CliResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            api_version: API_VERSION,
            data: Some(data),
            error: None,
        }
    }
}

impl CliResponse<()> {
    fn failed(message: &str) -> Self {
        Self {
            success: false,
            api_version: API_VERSION,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

/// Serialize `response` on a single line. An encoding failure still yields a
/// valid error envelope.
fn encode<T: Serialize>(response: &CliResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        let fallback = CliResponse::failed(&format!("failed to encode output: {}", e));
        serde_json::to_string(&fallback).unwrap_or_default()
    })
}

pub fn output_success<T: Serialize>(data: T) {
    println!("{}", encode(&CliResponse::ok(data)));
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    output_success(ListResponse {
        count: items.len(),
        items,
    });
}

/// Prints an error envelope to stderr and exits with status 1.
pub fn output_error(message: &str) -> ! {
    eprintln!("{}", encode(&CliResponse::failed(message)));
    std::process::exit(1);
}
