#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use oc_codec as codec;
pub use oc_reflect as reflect;
pub use oc_utils as utils;
