//! Scalar (`BindKind::Scalar`) implementations: numeric and boolean
//! primitives via strict `FromStr`, plus `String`, `Duration` and
//! `NaiveDateTime` via the dedicated converters in [`super::convert`].

use std::time::Duration;

use crate::error::WeaveError;
use crate::properties::PropertyStore;

use super::convert::{parse_datetime, parse_duration};
use super::{BindKind, BindParam, Bindable};

/// Read the raw property string for `param`, or its literal default, or
/// fail with a "not exist" message.
fn raw_value(store: &PropertyStore, param: &BindParam) -> Result<String, WeaveError> {
    let key = &param.tag.key;
    if store.has(key) {
        Ok(store.get(key))
    } else if let Some(default) = &param.tag.default {
        Ok(default.clone())
    } else {
        Err(WeaveError::bind_leaf(format!(
            "property \"{key}\": not exist"
        )))
    }
}

macro_rules! impl_scalar_fromstr {
    ($t:ty, $label:literal) => {
        impl Bindable for $t {
            const KIND: BindKind = BindKind::Scalar;

            fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
                let raw = raw_value(store, param)?;
                raw.parse::<$t>().map_err(|_| {
                    WeaveError::bind_leaf(format!("invalid {} value \"{}\"", $label, raw))
                })
            }
        }
    };
}

impl_scalar_fromstr!(i8, "int8");
impl_scalar_fromstr!(i16, "int16");
impl_scalar_fromstr!(i32, "int32");
impl_scalar_fromstr!(i64, "int64");
impl_scalar_fromstr!(u8, "uint8");
impl_scalar_fromstr!(u16, "uint16");
impl_scalar_fromstr!(u32, "uint32");
impl_scalar_fromstr!(u64, "uint64");
impl_scalar_fromstr!(f32, "float32");
impl_scalar_fromstr!(f64, "float64");
impl_scalar_fromstr!(bool, "bool");

impl Bindable for String {
    const KIND: BindKind = BindKind::Scalar;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
        raw_value(store, param)
    }
}

impl Bindable for Duration {
    const KIND: BindKind = BindKind::Scalar;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
        parse_duration(&raw_value(store, param)?)
    }
}

impl Bindable for chrono::NaiveDateTime {
    const KIND: BindKind = BindKind::Scalar;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
        parse_datetime(&raw_value(store, param)?)
    }
}
