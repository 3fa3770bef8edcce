use std::future::Future;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TelegramApiService: Send + Sync + 'static {
    /// Sends a text message to a chat via the bot API.
    ///
    /// Returns `Ok` whenever Telegram answered with a well formed response
    /// object, even if the message was rejected (`ok == false`). Network
    /// errors, timeouts and malformed responses are returned as `Err`.
    fn send_message(
        &self,
        message: TelegramMessage,
    ) -> impl Future<Output = anyhow::Result<TelegramSendMessageResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: TelegramParseMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramParseMode {
    Markdown,
    MarkdownV2,
    Html,
}

impl TelegramParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html => "HTML",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSendMessageResponse {
    pub ok: bool,
    pub description: Option<String>,
}

#[cfg(feature = "mock")]
impl MockTelegramApiService {
    pub fn with_send_message(
        mut self,
        message: TelegramMessage,
        result: Option<TelegramSendMessageResponse>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(message))
            .return_once(move |_| {
                Box::pin(std::future::ready(
                    result.ok_or_else(|| anyhow::anyhow!("connection refused")),
                ))
            });
        self
    }
}
