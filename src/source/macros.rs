use super::{SecretSource, SourceInfo};
use crate::Result;

/// A source entry in the link-time registry, keyed by its URI scheme.
#[doc(hidden)]
pub struct SourceRegistration {
    pub scheme: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
    pub factory: fn(&url::Url) -> Result<Box<dyn SecretSource>>,
}

impl SourceRegistration {
    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.scheme,
            description: self.description,
            examples: self.examples,
        }
    }
}

#[doc(hidden)]
#[linkme::distributed_slice]
pub static SOURCE_REGISTRY: [SourceRegistration];

/// Finds the source registered for `scheme`.
pub(crate) fn lookup(scheme: &str) -> Option<&'static SourceRegistration> {
    SOURCE_REGISTRY.iter().find(|reg| reg.scheme == scheme)
}

/// Registers a secret source under a URI scheme, which doubles as its name.
///
/// The config type is built with `TryFrom<&url::Url>` and handed to the
/// source's `new`.
///
/// ```ignore
/// register_source! {
///     struct: DotEnvSource,
///     config: DotEnvConfig,
///     scheme: "dotenv",
///     description: "Values from a dotenv file",
///     examples: ["dotenv://.env"],
/// }
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! register_source {
    (
        struct: $struct_name:ident,
        config: $config_type:ty,
        scheme: $scheme:literal,
        description: $description:expr,
        examples: [$($example:expr),* $(,)?] $(,)?
    ) => {
        impl $struct_name {
            const SOURCE_NAME: &'static str = $scheme;
        }

        const _: () = {
            #[linkme::distributed_slice($crate::source::SOURCE_REGISTRY)]
            static REGISTRATION: $crate::source::SourceRegistration =
                $crate::source::SourceRegistration {
                    scheme: $scheme,
                    description: $description,
                    examples: &[$($example),*],
                    factory: |url| Ok(Box::new(<$struct_name>::new(<$config_type>::try_from(url)?))),
                };
        };
    };
}
