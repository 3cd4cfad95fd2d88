//! Geomview `MESH` output.
//!
//! ```text
//! # <comment>
//! { appearance { +edge }
//! MESH <n + 2> <steps + 1>
//! <k / steps> <j / (n + 1)> <u_j>     one line per point, step after step
//! }
//! ```

use std::io::Write;

use crate::{
    driver::{ObsCtx, Observer, SimError},
    Float,
};

const PRECISION: usize = 6;

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Formats `value` like C's `printf("%g", value)`.
pub fn format_g(value: Float) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // the exponent is the one of the value rounded to PRECISION digits
    let sci = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Writes every step of a run as a Geomview mesh.
pub struct GeomviewWriter<W> {
    output: W,
}

impl<W: Write> GeomviewWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<W: Write> Observer for GeomviewWriter<W> {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        let mesh = ctx.mesh();
        writeln!(
            self.output,
            "# {}: backward Euler, n = {}, steps = {}",
            ctx.problem().name(),
            mesh.interior_points(),
            mesh.time().steps()
        )?;
        writeln!(self.output, "{{ appearance {{ +edge }}")?;
        writeln!(
            self.output,
            "MESH {} {}",
            mesh.space().steps() + 1,
            mesh.time().steps() + 1
        )?;

        // write initial condition
        self.at_each_iteration(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        let (time, space) = (ctx.mesh().time(), ctx.mesh().space());
        let u = ctx.solution();
        let t = format_g(time.fraction(ctx.iter()));
        for j in 0..u.nrows() {
            writeln!(
                self.output,
                "{} {} {}",
                t,
                format_g(space.fraction(j)),
                format_g(u.read(j, 0))
            )?;
        }
        Ok(())
    }

    fn at_cleanup(&mut self, _ctx: ObsCtx) -> Result<(), SimError> {
        writeln!(self.output, "}}")?;
        self.output.flush().map_err(SimError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{driver::Driver, problem::Heat1, sim::Simulation};

    #[test]
    fn printf_g_formatting() {
        let cases = [
            (0.0, "0"),
            (1.0, "1"),
            (0.5, "0.5"),
            (-0.25, "-0.25"),
            (1.0 / 3.0, "0.333333"),
            (2.0 / 3.0, "0.666667"),
            (0.0001, "0.0001"),
            (0.00001, "1e-05"),
            (123456.0, "123456"),
            (1234567.0, "1.23457e+06"),
            (123456789.0, "1.23457e+08"),
            (6.123233995736766e-17, "6.12323e-17"),
            (1e100, "1e+100"),
            (Float::INFINITY, "inf"),
            (Float::NAN, "nan"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_g(value), expected, "{value:e}");
        }
    }

    #[test]
    fn writes_header_rows_and_footer() {
        let mut buffer = Vec::new();
        let sim = Simulation::new(Heat1, 1.0, 2, 2).unwrap();
        Driver::new(sim)
            .with_observer(GeomviewWriter::new(&mut buffer))
            .run()
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# heat1: backward Euler, n = 2, steps = 2");
        assert_eq!(lines[1], "{ appearance { +edge }");
        assert_eq!(lines[2], "MESH 4 3");
        assert_eq!(lines.len(), 3 + 4 * 3 + 1);
        assert_eq!(lines[3], "0 0 6.12323e-17");
        assert_eq!(lines[4], "0 0.333333 0.866025");
        assert!(lines[7].starts_with("0.5 0 "));
        assert_eq!(*lines.last().unwrap(), "}");
    }
}
