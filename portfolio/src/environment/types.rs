use portfolio_core_contact_impl::{ContactRelayServiceImpl, ContactServiceImpl};
use portfolio_extern_impl::{relay::ContactRelayApiServiceImpl, telegram::TelegramApiServiceImpl};
use portfolio_shared_impl::time::TimeServiceImpl;

// API
pub type RestServer = portfolio_api_rest::RestServer<Contact>;

// Extern
pub type TelegramApi = TelegramApiServiceImpl;
pub type RelayApi = ContactRelayApiServiceImpl;

// Shared
pub type Time = TimeServiceImpl;

// Core
pub type Contact = ContactServiceImpl<TelegramApi, Time>;
pub type ContactRelay = ContactRelayServiceImpl<RelayApi>;
