//! Fixed-size rtnetlink payload headers and attribute ids.

/// Adds `SIZE` and a prefix decoder to a `#[repr(C)]` zerocopy header.
macro_rules! fixed_header {
    ($ty:ty) => {
        impl $ty {
            pub const SIZE: usize = size_of::<Self>();

            /// Decodes the header from the front of `data`; trailing attributes are ignored.
            pub fn from_bytes(data: &[u8]) -> $crate::netlink::error::Result<Self> {
                <Self as zerocopy::FromBytes>::read_from_prefix(data)
                    .map(|(header, _)| header)
                    .map_err(|_| $crate::netlink::error::Error::Truncated {
                        expected: Self::SIZE,
                        actual: data.len(),
                    })
            }
        }
    };
}

pub(crate) use fixed_header;

pub mod addr;
pub mod link;
