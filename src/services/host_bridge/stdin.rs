use crate::error::Result;
use crate::events::HostEvent;
use crate::proceed_error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::HostBridge;

/// Построчный протокол на stdin, который пишет расширение-мост редактора
pub struct StdinBridge;

impl StdinBridge {
    pub fn new() -> Self {
        info!("Инициализация StdinBridge");
        Self
    }

    /// Некорректные строки пропускаются с предупреждением
    pub async fn pump<R>(mut reader: R, events: mpsc::Sender<HostEvent>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut line_no: u64 = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_no += 1;

            // Битая кодировка портит одну строку, а не весь поток
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    warn!("Строка {} пропущена: не UTF-8 ({})", line_no, e);
                    continue;
                }
            };

            let event = match HostEvent::parse_line(line) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Строка {} пропущена: {}", line_no, e);
                    continue;
                }
            };

            debug!("Событие хоста: {:?}", event);
            events
                .send(event)
                .await
                .map_err(|_| proceed_error!(internal, "канал событий сессии закрыт"))?;
        }

        info!("Хост закрыл поток событий после {} строк", line_no);
        Ok(())
    }
}

#[async_trait::async_trait]
impl HostBridge for StdinBridge {
    async fn run(self: Box<Self>, events: mpsc::Sender<HostEvent>) -> Result<()> {
        Self::pump(BufReader::new(tokio::io::stdin()), events).await
    }
}
