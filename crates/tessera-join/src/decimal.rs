//! Canonical numeric form shared by every BSON number type.
//!
//! `Int32`, `Int64`, `Double` and `Decimal128` all reduce to a [`Number`]
//! so that equal values compare equal regardless of representation.

use bson::Decimal128;

/// Decimal128 exponent bias (IEEE 754-2008, BID encoding).
const EXPONENT_BIAS: i32 = 6176;

/// Largest canonical Decimal128 coefficient, 10^34 - 1.
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999;

const COEFFICIENT_MASK: u128 = (1 << 113) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Number {
    /// Every NaN: double or decimal, signalling or quiet, any sign.
    NaN,
    Infinity {
        negative: bool,
    },
    /// `(-1)^negative * coefficient * 10^exponent`, trailing zeros stripped.
    /// Zero is always `{ negative: false, coefficient: 0, exponent: 0 }`.
    Finite {
        negative: bool,
        coefficient: u128,
        exponent: i32,
    },
    /// `(-1)^negative * mantissa * 2^exponent` with an odd mantissa. Only
    /// doubles whose exact decimal expansion outgrows the coefficient land
    /// here.
    Binary {
        negative: bool,
        mantissa: u64,
        exponent: i32,
    },
}

impl Number {
    pub(crate) fn from_i64(n: i64) -> Self {
        Self::finite(n < 0, u128::from(n.unsigned_abs()), 0)
    }

    /// Finite doubles are decoded exactly from their IEEE bits as
    /// `mantissa * 2^exponent`. Integral values become integers; a fraction
    /// `m * 2^-k` becomes `m * 5^k * 10^-k`. A double whose exact decimal
    /// form does not fit the coefficient is kept in binary form: no integer
    /// or Decimal128 can equal it.
    pub(crate) fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            return Self::NaN;
        }
        if f.is_infinite() {
            return Self::Infinity {
                negative: f < 0.0,
            };
        }
        if f == 0.0 {
            return Self::finite(false, 0, 0);
        }

        let negative = f < 0.0;
        let bits = f.to_bits();
        let biased = ((bits >> 52) & 0x7FF) as i32;
        let fraction = bits & ((1 << 52) - 1);
        let (mut mantissa, mut exponent) = if biased == 0 {
            // subnormal
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), biased - 1075)
        };
        let zeros = mantissa.trailing_zeros();
        mantissa >>= zeros;
        exponent += zeros as i32;

        let decimal = if exponent >= 0 {
            let width = 128 - u128::from(mantissa).leading_zeros();
            (width + exponent as u32 <= 128).then(|| (u128::from(mantissa) << exponent, 0))
        } else {
            let k = exponent.unsigned_abs();
            5u128
                .checked_pow(k)
                .and_then(|pow| pow.checked_mul(u128::from(mantissa)))
                .map(|coefficient| (coefficient, exponent))
        };

        match decimal {
            Some((coefficient, exponent)) => Self::finite(negative, coefficient, exponent),
            None => Self::Binary {
                negative,
                mantissa,
                exponent,
            },
        }
    }

    pub(crate) fn from_decimal128(d: Decimal128) -> Self {
        let bits = u128::from_le_bytes(d.bytes());
        let negative = bits >> 127 == 1;

        match (bits >> 122) & 0x1F {
            0x1F => return Self::NaN,
            0x1E => return Self::Infinity { negative },
            _ => {}
        }

        let (biased, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
            // Large-coefficient form: always above MAX_COEFFICIENT, which
            // decodes as zero.
            (((bits >> 111) & 0x3FFF) as i32, 0)
        } else {
            (((bits >> 113) & 0x3FFF) as i32, bits & COEFFICIENT_MASK)
        };
        let coefficient = if coefficient > MAX_COEFFICIENT {
            0
        } else {
            coefficient
        };

        Self::finite(negative, coefficient, biased - EXPONENT_BIAS)
    }

    fn finite(negative: bool, mut coefficient: u128, mut exponent: i32) -> Self {
        if coefficient == 0 {
            return Self::Finite {
                negative: false,
                coefficient: 0,
                exponent: 0,
            };
        }
        while coefficient % 10 == 0 {
            coefficient /= 10;
            exponent += 1;
        }
        Self::Finite {
            negative,
            coefficient,
            exponent,
        }
    }
}
