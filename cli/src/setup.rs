//! First-run interactive setup on stdin.

use std::io::{BufRead, Write};

use crate::config::{AppConfig, ConfigError};

/// Ask for every required key. Numeric answers are re-asked until they parse.
pub fn prompt_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<AppConfig, ConfigError> {
    let bot_token = ask(input, output, "Masukkan Bot Token: ")?;
    let chat_id = ask(input, output, "Masukkan Chat ID: ")?;
    let threshold_percent = ask_number(
        input,
        output,
        "Masukkan batas persentase perubahan harga yang diinginkan: ",
    )?;
    let threshold_price_idr =
        ask_number(input, output, "Masukkan batas harga IDR yang diinginkan: ")?;
    let threshold_volume_change =
        ask_number(input, output, "Masukkan batas perubahan volume yang diinginkan: ")?;
    let interval = ask_number(input, output, "Masukkan waktu interval pemantauan harga (detik): ")?;
    let volume_threshold = ask_number(input, output, "Masukkan batas volume yang diinginkan: ")?;

    Ok(AppConfig::with_required(
        bot_token,
        chat_id,
        threshold_percent,
        threshold_price_idr,
        threshold_volume_change,
        interval,
        volume_threshold,
    ))
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String, ConfigError> {
    write!(output, "{prompt}").and_then(|_| output.flush()).map_err(stdio_error)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(stdio_error)?;
    if read == 0 {
        return Err(ConfigError::Invalid(format!("setup aborted at \"{}\"", prompt.trim())));
    }
    Ok(line.trim().to_string())
}

fn ask_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<f64, ConfigError> {
    loop {
        let answer = ask(input, output, prompt)?;
        match answer.replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => return Ok(v),
            _ => writeln!(output, "Nilai tidak valid: {answer:?}").map_err(stdio_error)?,
        }
    }
}

fn stdio_error(source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: "<stdin>".into(),
        source,
    }
}
