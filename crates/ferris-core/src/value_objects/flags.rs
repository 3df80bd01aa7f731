//! Account and guild flags
//!
//! Both are plain integer bitfields on the wire. Unknown bits are kept so a
//! newer server never loses information through a round trip.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Flags attached to a user account
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UserFlags: u64 {
        const BOT_ACCOUNT            = 1 << 0;
        /// Confirmed scam account
        const VERIFIED_SCAM          = 1 << 1;
        const POSSIBLE_SCAM          = 1 << 2;
        const COMPROMISED            = 1 << 3;
        /// Official system account
        const SYSTEM                 = 1 << 4;
        const EARLY_BOT              = 1 << 5;
        const EARLY_BOT_DEV          = 1 << 6;
        const EARLY_SUPPORTER        = 1 << 7;
        const DONATOR                = 1 << 8;
        const LIBRARY_DEV            = 1 << 9;
        const CONTRIBUTOR            = 1 << 10;
        const MAINTAINER             = 1 << 11;
        const CHRISTMAS_EVENT_WINNER = 1 << 12;
        const BUG_HUNTER             = 1 << 13;

        const _ = !0;
    }
}

bitflags! {
    /// Flags attached to a guild
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GuildFlags: u64 {
        const VERIFIED_GUILD = 1 << 0;
        const VERIFIED_SCAM  = 1 << 1;

        const _ = !0;
    }
}

macro_rules! impl_flag_codec {
    ($name:ident) => {
        impl $name {
            /// Names of every known flag that is set
            pub fn list(&self) -> Vec<&'static str> {
                self.iter_names().map(|(name, _)| name).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.bits())
            }
        }

        impl From<u64> for $name {
            fn from(bits: u64) -> Self {
                $name::from_bits_retain(bits)
            }
        }

        impl From<$name> for u64 {
            fn from(flags: $name) -> Self {
                flags.bits()
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_u64(self.bits())
            }
        }

        // Accepts a number, a numeric string or null
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                use serde::de::{self, Visitor};

                struct FlagVisitor;

                impl Visitor<'_> for FlagVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str("an integer or string holding flag bits")
                    }

                    fn visit_i64<E>(self, value: i64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name::from_bits_retain(value as u64))
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name::from_bits_retain(value))
                    }

                    fn visit_str<E>(self, value: &str) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        value
                            .parse::<u64>()
                            .map($name::from_bits_retain)
                            .map_err(|_| de::Error::custom("invalid flag bits"))
                    }

                    fn visit_unit<E>(self) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name::empty())
                    }
                }

                deserializer.deserialize_any(FlagVisitor)
            }
        }
    };
}

impl_flag_codec!(UserFlags);
impl_flag_codec!(GuildFlags);

impl UserFlags {
    /// Whether the account belongs to a bot
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.contains(Self::BOT_ACCOUNT)
    }

    /// Whether the account is flagged as a confirmed or suspected scam
    #[inline]
    pub fn is_suspicious(&self) -> bool {
        self.intersects(Self::VERIFIED_SCAM | Self::POSSIBLE_SCAM | Self::COMPROMISED)
    }
}
