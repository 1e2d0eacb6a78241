//! Company lookup by CNPJ (Brazilian company registry number).
//!
//! Lookups consult a local JSON registry first, then BrasilAPI, then
//! ReceitaWS. Whatever answers, the result is normalised to a
//! [`CompanyRecord`]. Intermediate provider failures are logged and
//! swallowed; only the final miss reaches the caller.

mod error;
mod provider;
mod record;
mod registry;
mod resolver;

pub use error::LookupError;
pub use error::Result;
pub use provider::BrasilApiProvider;
pub use provider::CnpjProvider;
pub use provider::ProviderSettings;
pub use provider::ReceitaWsProvider;
pub use record::CompanyRecord;
pub use record::LookupOutcome;
pub use record::LookupSource;
pub use record::format_address;
pub use registry::LocalRegistry;
pub use resolver::CnpjResolver;

/// Strip everything but ASCII digits (`"00.000.000/0001-91"` → `"00000000000191"`).
pub fn normalize_cnpj(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
