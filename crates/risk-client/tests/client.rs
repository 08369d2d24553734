use risk_client::Client;
use risk_models::Risk;
use risk_monitor::Sources;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// Serve a single HTTP/1.1 response having `status` and `body` to the
// first connection, returning the API base URL of the server.
async fn serve_once(status: &'static str, body: &'static str) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // Read through the end of the request head. These are GET requests without bodies.
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    format!("http://{addr}/api/v1/").parse().unwrap()
}

fn client(api_url: url::Url) -> Client {
    Client::new(api_url, std::time::Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_history_tolerates_extra_fields() {
    let api_url = serve_once(
        "200 OK",
        r#"[
            {"region": "Nilgiris (Ooty)", "risk": "High", "lat": 11.4102, "lon": 76.695,
             "timestamp": "2024-11-02", "type": "Landslide",
             "metrics": {"slope": 85, "rain": 90, "twi": 70, "ndvi": 40}},
            {"region": "Chennai", "risk": "Low"}
        ]"#,
    )
    .await;

    let records = client(api_url).history().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].risk, Risk::High);
    assert_eq!(records[0].lat, Some(11.4102));
    assert_eq!(records[0].metrics.as_ref().map(|m| m.moisture), Some(None));
    assert_eq!(records[1].region, "Chennai");
    assert_eq!(records[1].lon, None);
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let api_url = serve_once("503 Service Unavailable", r#"{"detail":"warming up"}"#).await;

    let err = client(api_url).simulate().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"GET simulate: 503 Service Unavailable: {"detail":"warming up"}"#
    );
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let api_url = serve_once("200 OK", r#"{"not": "a list"}"#).await;

    let err = client(api_url).history().await.unwrap_err();
    assert_eq!(err.to_string(), "deserializing history response body");
}
