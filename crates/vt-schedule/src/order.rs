//! Intra-tick ordering key for the bucketed policy.

use std::fmt;

/// Sort key of a behavior within one tick.
///
/// Ordered behaviors sort first, by ascending order value; unordered
/// behaviors sort after all of them and compare equal among themselves, so
/// their relative order is whatever the (stable) sort leaves it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderKey {
    Ordered(i32),
    Unordered,
}

impl From<Option<i32>> for OrderKey {
    fn from(order: Option<i32>) -> Self {
        order.map_or(OrderKey::Unordered, OrderKey::Ordered)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKey::Ordered(n) => write!(f, "#{n}"),
            OrderKey::Unordered  => f.write_str("#-"),
        }
    }
}
