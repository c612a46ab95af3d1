#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Atom feed with one entry per arXiv id, in order.
pub fn atom_feed(ids: &[&str]) -> String {
    let entries = ids
        .iter()
        .map(|id| {
            format!(
                r#"  <entry>
    <id>http://arxiv.org/abs/{id}</id>
    <updated>2025-01-09T18:00:00Z</updated>
    <published>2025-01-08T18:00:00Z</published>
    <title>Paper {id}</title>
    <summary>Abstract of {id}.</summary>
    <author><name>Ada Lovelace</name></author>
    <link href="http://arxiv.org/abs/{id}" rel="alternate" type="text/html"/>
    <category term="cs.AR" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
"#
            )
        })
        .collect::<String>();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=cat:cs.AR</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2025-01-10T00:00:00-05:00</updated>
{entries}</feed>"#
    )
}

/// Serves the current body to every GET, one connection per request.
pub struct FeedServer {
    pub base_url: String,
    body: Arc<Mutex<String>>,
    hits: Arc<AtomicUsize>,
}

impl FeedServer {
    pub async fn start(body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = Arc::new(Mutex::new(body));
        let hits = Arc::new(AtomicUsize::new(0));

        let served = body.clone();
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let served = served.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 4096];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let payload = served.lock().unwrap().clone();
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/atom+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        payload.len(),
                        payload
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}/api/query", addr),
            body,
            hits,
        }
    }

    pub fn set_body(&self, body: String) {
        *self.body.lock().unwrap() = body;
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
