//! Serde adapter for arkworks types via their canonical compressed encoding.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use serde::{Deserializer, Serializer};
use serde_with::{Bytes, DeserializeAs, SerializeAs};

pub struct SerdeAs;

impl<T: CanonicalSerialize> SerializeAs<T> for SerdeAs {
    fn serialize_as<S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut bytes = Vec::with_capacity(value.serialized_size(Compress::Yes));
        value
            .serialize_with_mode(&mut bytes, Compress::Yes)
            .map_err(serde::ser::Error::custom)?;
        Bytes::serialize_as(&bytes, serializer)
    }
}

impl<'de, T: CanonicalDeserialize> DeserializeAs<'de, T> for SerdeAs {
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Bytes::deserialize_as(deserializer)?;
        T::deserialize_with_mode(&mut bytes.as_slice(), Compress::Yes, Validate::Yes)
            .map_err(serde::de::Error::custom)
    }
}
