use crate::domain::model::{LogLevel, ProgressEvent};
use crate::domain::ports::ProgressSink;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// 編碼成一個 `data: <json>\n\n` 訊框
pub fn encode_frame(event: &ProgressEvent) -> Vec<u8> {
    let json = serde_json::to_string(event).unwrap_or_else(|e| {
        serde_json::json!({"log": format!("Failed to encode event: {}", e), "type": "error"})
            .to_string()
    });
    format!("data: {}\n\n", json).into_bytes()
}

/// 把串流內容解回事件，供測試與 CLI 使用
pub fn decode_frames(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.trim().strip_prefix("data:"))
        .filter_map(|json| serde_json::from_str(json.trim()).ok())
        .collect()
}

/// 把事件送進 channel，接收端是 `EventStream`
pub struct ChannelSink {
    sender: Sender<Vec<u8>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<Vec<u8>>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // 客戶端中斷連線後接收端已關閉，執行仍會繼續到結束
        if self.sender.send(encode_frame(&event)).is_err() {
            tracing::debug!("Progress stream receiver dropped");
        }
    }
}

/// 依序取出訊框；所有 sender 都釋放後結束
pub struct EventStream {
    receiver: Receiver<Vec<u8>>,
}

impl EventStream {
    pub fn new(receiver: Receiver<Vec<u8>>) -> Self {
        Self { receiver }
    }

    /// 以 HTTP/1.1 chunked 編碼寫出，每個訊框一個 chunk 並立即 flush
    pub fn write_chunked<W: Write>(self, writer: &mut W) -> io::Result<usize> {
        let mut frames = 0;
        for frame in self {
            write!(writer, "{:X}\r\n", frame.len())?;
            writer.write_all(&frame)?;
            writer.write_all(b"\r\n")?;
            writer.flush()?;
            frames += 1;
        }
        writer.write_all(b"0\r\n\r\n")?;
        writer.flush()?;
        Ok(frames)
    }
}

impl Iterator for EventStream {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

pub fn event_channel() -> (ChannelSink, EventStream) {
    let (sender, receiver) = mpsc::channel();
    (ChannelSink::new(sender), EventStream::new(receiver))
}

#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn logs(&self, wanted: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Log { log, level } if level == wanted => Some(log),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// 終端機輸出，結果摘要另由呼叫端處理
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Log { log, level } => {
                let marker = match level {
                    LogLevel::Info => "ℹ️ ",
                    LogLevel::Success => "✅",
                    LogLevel::Warning => "⚠️ ",
                    LogLevel::Error => "❌",
                };
                match level {
                    LogLevel::Error => eprintln!("{} {}", marker, log),
                    _ => println!("{} {}", marker, log),
                }
            }
            ProgressEvent::Results { .. } => {}
        }
    }
}
