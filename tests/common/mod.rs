//! In-process SOCKS5 proxy that plays a scripted NNTP server
//!
//! Accepts a single connection, completes the SOCKS5 handshake, then answers
//! POST according to a [`Script`] while recording every byte the client
//! sends after the handshake.

#![allow(dead_code)]

use newsrelay::{Endpoint, RelayConfig};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the mock behaves
#[derive(Debug, Clone)]
pub struct Script {
    /// SOCKS5 reply code for CONNECT (0 = succeeded)
    pub socks_reply: u8,
    /// Greeting line; `None` hangs up right after the tunnel is up
    pub greeting: Option<&'static str>,
    /// Reply to POST
    pub post_reply: &'static str,
    /// Reply after the article; `None` hangs up instead
    pub result_reply: Option<&'static str>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            socks_reply: 0,
            greeting: Some("200 news.example.org ready - posting ok\r\n"),
            post_reply: "340 Input accepted\r\n",
            result_reply: Some("240 Article received OK\r\n"),
        }
    }
}

impl Script {
    pub fn post_reply(mut self, reply: &'static str) -> Self {
        self.post_reply = reply;
        self
    }

    pub fn result_reply(mut self, reply: Option<&'static str>) -> Self {
        self.result_reply = reply;
        self
    }

    pub fn greeting(mut self, greeting: Option<&'static str>) -> Self {
        self.greeting = greeting;
        self
    }

    pub fn socks_reply(mut self, code: u8) -> Self {
        self.socks_reply = code;
        self
    }
}

/// What the mock saw
#[derive(Debug, Default)]
pub struct Transcript {
    /// CONNECT target host as sent by the client
    pub target_host: String,
    /// CONNECT target port
    pub target_port: u16,
    /// Bytes received after the SOCKS5 handshake
    pub received: Vec<u8>,
}

impl Transcript {
    pub fn received_text(&self) -> String {
        String::from_utf8_lossy(&self.received).into_owned()
    }
}

/// Target server name used by [`config_for`]
pub const SERVER_HOST: &str = "news.example.org";

/// Relay configuration pointing at a mock proxy
pub fn config_for(proxy: Endpoint) -> RelayConfig {
    RelayConfig::default()
        .with_server(Endpoint::new(SERVER_HOST, 119))
        .with_proxy(proxy)
        .with_timeouts(Some(Duration::from_secs(5)), Some(Duration::from_secs(5)))
}

/// Bind the mock on an ephemeral port and serve one connection
pub async fn spawn_mock(script: Script) -> (Endpoint, JoinHandle<Transcript>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        serve(socket, script).await
    });

    (Endpoint::new("127.0.0.1", port), handle)
}

async fn serve(mut socket: tokio::net::TcpStream, script: Script) -> Transcript {
    let mut transcript = Transcript::default();

    // Method negotiation
    let mut head = [0u8; 2];
    socket.read_exact(&mut head).await.unwrap();
    assert_eq!(head[0], 5, "client must speak SOCKS5");
    let mut methods = vec![0u8; usize::from(head[1])];
    socket.read_exact(&mut methods).await.unwrap();
    assert!(methods.contains(&0), "client must offer no-auth");
    socket.write_all(&[5, 0]).await.unwrap();

    // CONNECT request
    let mut request = [0u8; 4];
    socket.read_exact(&mut request).await.unwrap();
    assert_eq!(&request[..3], &[5, 1, 0]);
    transcript.target_host = match request[3] {
        1 => {
            let mut ip = [0u8; 4];
            socket.read_exact(&mut ip).await.unwrap();
            Ipv4Addr::from(ip).to_string()
        }
        3 => {
            let mut len = [0u8; 1];
            socket.read_exact(&mut len).await.unwrap();
            let mut name = vec![0u8; usize::from(len[0])];
            socket.read_exact(&mut name).await.unwrap();
            String::from_utf8(name).unwrap()
        }
        4 => {
            let mut ip = [0u8; 16];
            socket.read_exact(&mut ip).await.unwrap();
            Ipv6Addr::from(ip).to_string()
        }
        other => panic!("unexpected address type {}", other),
    };
    let mut port = [0u8; 2];
    socket.read_exact(&mut port).await.unwrap();
    transcript.target_port = u16::from_be_bytes(port);

    socket
        .write_all(&[5, script.socks_reply, 0, 1, 0, 0, 0, 0, 0, 0])
        .await
        .unwrap();
    if script.socks_reply != 0 {
        return transcript;
    }

    // NNTP
    let Some(greeting) = script.greeting else {
        return transcript;
    };
    let mut reader = BufReader::new(socket);
    reader.get_mut().write_all(greeting.as_bytes()).await.unwrap();

    let n = reader
        .read_until(b'\n', &mut transcript.received)
        .await
        .unwrap();
    if n == 0 {
        return transcript;
    }
    reader
        .get_mut()
        .write_all(script.post_reply.as_bytes())
        .await
        .unwrap();

    if script.post_reply.starts_with("340") {
        // Collect the article up to the terminating dot line
        while !transcript.received.ends_with(b"\r\n.\r\n") {
            let n = reader
                .read_until(b'\n', &mut transcript.received)
                .await
                .unwrap();
            if n == 0 {
                return transcript;
            }
        }
        match script.result_reply {
            Some(reply) => reader.get_mut().write_all(reply.as_bytes()).await.unwrap(),
            None => return transcript,
        }
    }

    // Whatever follows (QUIT or nothing) until the client closes
    let _ = reader.read_to_end(&mut transcript.received).await;
    transcript
}
