//! Built-in formula functions.

use crate::error::ExpressionError;
use crate::numeric::round_half_up;
use rand::{Rng, RngCore};

/// A function callable from a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Abs,
    Acos,
    Asin,
    Atan,
    Cbrt,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Expm1,
    Floor,
    Log,
    Log10,
    Log2,
    Log1p,
    Signum,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    ToRadian,
    ToDegree,
    Min,
    Max,
    Pow,
    Atan2,
    RandomInt,
    Random,
}

impl Function {
    /// Look a function up by the name used in formulas.
    pub(crate) fn lookup(name: &str) -> Option<Function> {
        let function = match name {
            "abs" => Function::Abs,
            "acos" => Function::Acos,
            "asin" => Function::Asin,
            "atan" => Function::Atan,
            "cbrt" => Function::Cbrt,
            "ceil" => Function::Ceil,
            "cos" => Function::Cos,
            "cosh" => Function::Cosh,
            "exp" => Function::Exp,
            "expm1" => Function::Expm1,
            "floor" => Function::Floor,
            "log" => Function::Log,
            "log10" => Function::Log10,
            "log2" => Function::Log2,
            "log1p" => Function::Log1p,
            "signum" => Function::Signum,
            "sin" => Function::Sin,
            "sinh" => Function::Sinh,
            "sqrt" => Function::Sqrt,
            "tan" => Function::Tan,
            "tanh" => Function::Tanh,
            "toRadian" => Function::ToRadian,
            "toDegree" => Function::ToDegree,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            "atan2" => Function::Atan2,
            "randomInt" => Function::RandomInt,
            "random" => Function::Random,
            _ => return None,
        };
        Some(function)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Acos => "acos",
            Function::Asin => "asin",
            Function::Atan => "atan",
            Function::Cbrt => "cbrt",
            Function::Ceil => "ceil",
            Function::Cos => "cos",
            Function::Cosh => "cosh",
            Function::Exp => "exp",
            Function::Expm1 => "expm1",
            Function::Floor => "floor",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Log2 => "log2",
            Function::Log1p => "log1p",
            Function::Signum => "signum",
            Function::Sin => "sin",
            Function::Sinh => "sinh",
            Function::Sqrt => "sqrt",
            Function::Tan => "tan",
            Function::Tanh => "tanh",
            Function::ToRadian => "toRadian",
            Function::ToDegree => "toDegree",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
            Function::Atan2 => "atan2",
            Function::RandomInt => "randomInt",
            Function::Random => "random",
        }
    }

    pub(crate) fn arity(self) -> usize {
        match self {
            Function::Random => 0,
            Function::Min | Function::Max | Function::Pow | Function::Atan2 => 2,
            _ => 1,
        }
    }

    /// Apply the function. `args.len()` equals `self.arity()`.
    pub(crate) fn apply(self, args: &[f64], rng: &mut dyn RngCore) -> Result<f64, ExpressionError> {
        let value = match self {
            Function::Abs => args[0].abs(),
            Function::Acos => args[0].acos(),
            Function::Asin => args[0].asin(),
            Function::Atan => args[0].atan(),
            Function::Cbrt => args[0].cbrt(),
            Function::Ceil => args[0].ceil(),
            Function::Cos => args[0].cos(),
            Function::Cosh => args[0].cosh(),
            Function::Exp => args[0].exp(),
            Function::Expm1 => args[0].exp_m1(),
            Function::Floor => args[0].floor(),
            Function::Log => args[0].ln(),
            Function::Log10 => args[0].log10(),
            Function::Log2 => args[0].log2(),
            Function::Log1p => args[0].ln_1p(),
            Function::Signum => signum(args[0]),
            Function::Sin => args[0].sin(),
            Function::Sinh => args[0].sinh(),
            Function::Sqrt => args[0].sqrt(),
            Function::Tan => args[0].tan(),
            Function::Tanh => args[0].tanh(),
            Function::ToRadian => args[0].to_radians(),
            Function::ToDegree => args[0].to_degrees(),
            Function::Min => args[0].min(args[1]),
            Function::Max => args[0].max(args[1]),
            Function::Pow => args[0].powf(args[1]),
            Function::Atan2 => args[0].atan2(args[1]),
            Function::RandomInt => random_int(args[0], rng)?,
            Function::Random => rng.gen::<f64>(),
        };
        Ok(value)
    }
}

/// Sign of `x`, keeping zero and NaN as they are.
fn signum(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

/// Uniform integer in `[0, round(bound))`.
fn random_int(bound: f64, rng: &mut dyn RngCore) -> Result<f64, ExpressionError> {
    let rounded = round_half_up(bound);
    if !(rounded >= 1.0 && rounded <= i32::MAX as f64) {
        return Err(ExpressionError::Evaluation {
            function: Function::RandomInt.name().to_string(),
            reason: format!("bound {} is not a positive 32-bit integer", bound),
        });
    }
    Ok(rng.gen_range(0..rounded as i32) as f64)
}
