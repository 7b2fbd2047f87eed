use std::net::SocketAddr;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Line-oriented client speaking the home controller's TCP protocol.
pub struct Hc3Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Hc3Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect to HC3 port");
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Send one command and read the one-line JSON reply.
    pub async fn send(&mut self, command: &Value) -> Value {
        self.send_raw(&command.to_string()).await
    }

    pub async fn send_raw(&mut self, line: &str) -> Value {
        self.writer
            .write_all(line.as_bytes())
            .await
            .expect("write command");
        self.writer.write_all(b"\n").await.expect("write newline");
        self.writer.flush().await.expect("flush");

        let reply = self
            .lines
            .next_line()
            .await
            .expect("read reply")
            .expect("connection stays open");
        serde_json::from_str(&reply).expect("reply is JSON")
    }
}
