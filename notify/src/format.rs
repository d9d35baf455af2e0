//! Message texts sent to the chat.

use chrono::TimeDelta;

use crate::alert::{Alert, Direction, MaintenanceAlert, MoveAlert, MoveKind};

pub fn format_alert(alert: &Alert) -> String {
    match alert {
        Alert::Move(m) => match m.kind {
            MoveKind::PriceChange => format_price_change(m),
            MoveKind::PumpDump(_) => format_pump_dump(m),
        },
        Alert::Maintenance(m) => format_maintenance(m),
    }
}

fn format_price_change(m: &MoveAlert) -> String {
    let verb = match m.direction {
        Direction::Up => "Naik",
        Direction::Down => "Turun",
    };

    let mut out = format!(
        "{} {} ({:.2}%)\n\
         Harga : Rp.{}\n\
         Harga sebelumnya : Rp.{}\n\
         Volume : Rp.{}\n\
         (Volume trades : Rp.{})\n\
         {} dalam kurun waktu : {}",
        m.direction.glyph(),
        m.pair.label(),
        m.change_pct,
        format_idr(m.price),
        format_idr(m.prev_price),
        format_idr(m.volume),
        format_idr(m.volume_delta),
        verb,
        format_elapsed(m.elapsed),
    );
    push_annotations(&mut out, m);
    out
}

fn format_pump_dump(m: &MoveAlert) -> String {
    let MoveKind::PumpDump(severity) = m.kind else {
        return format_price_change(m);
    };
    let side = match m.direction {
        Direction::Up => "PUMP",
        Direction::Down => "DUMP",
    };

    let mut out = format!(
        "{}\n\
         {} {} ({:.2}%)\n\
         Harga: Rp.{}\n\
         Harga sebelumnya: Rp.{}\n\
         Volume: Rp.{}\n\
         (Volume Trades: Rp.{})\n\
         {} dalam waktu: {}",
        severity.banner(m.direction),
        m.direction.glyph(),
        m.pair.label(),
        m.change_pct,
        format_idr(m.price),
        format_idr(m.prev_price),
        format_idr(m.volume),
        format_idr(m.volume_delta),
        side,
        format_elapsed(m.elapsed),
    );
    push_annotations(&mut out, m);
    out
}

fn push_annotations(out: &mut String, m: &MoveAlert) {
    if let Some(rank) = m.rank {
        out.push_str(&format!("\nPeringkat 24 jam : {rank}"));
    }
    if m.under_maintenance {
        out.push_str("\n🛠 Wallet sedang maintenance");
    }
}

fn format_maintenance(m: &MaintenanceAlert) -> String {
    let label = format!("{}/IDR", m.asset().to_uppercase());
    match m {
        MaintenanceAlert::Started { .. } => format!("🛠 {label} wallet maintenance dimulai"),
        MaintenanceAlert::Ended { duration, .. } => format!(
            "✅ {label} wallet maintenance selesai\nDurasi : {}",
            format_elapsed(*duration)
        ),
    }
}

/// Whole rupiah with thousands separators: `1234567.6` → `1,234,568`.
pub fn format_idr(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if negative { format!("-{out}") } else { out }
}

/// `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Escape free text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use market::{Pair, RankLabel};

    use super::*;
    use crate::alert::Severity;

    fn move_alert(kind: MoveKind, pct: f64) -> MoveAlert {
        MoveAlert {
            pair: Pair::parse("btc_idr"),
            kind,
            direction: Direction::of(pct),
            change_pct: pct,
            price: 1_050_000_000.0,
            prev_price: 1_000_000_000.0,
            volume: 12_345_678_901.4,
            volume_delta: -600_000_000.0,
            elapsed: TimeDelta::seconds(3 * 3600 + 5 * 60 + 9),
            under_maintenance: false,
            rank: None,
        }
    }

    #[test]
    fn idr_amounts_get_thousands_separators() {
        assert_eq!(format_idr(0.0), "0");
        assert_eq!(format_idr(999.4), "999");
        assert_eq!(format_idr(1000.0), "1,000");
        assert_eq!(format_idr(1_234_567.6), "1,234,568");
        assert_eq!(format_idr(-600_000_000.0), "-600,000,000");
    }

    #[test]
    fn elapsed_is_zero_padded_and_not_wrapped() {
        assert_eq!(format_elapsed(TimeDelta::seconds(59)), "00:00:59");
        assert_eq!(format_elapsed(TimeDelta::seconds(26 * 3600 + 61)), "26:01:01");
        assert_eq!(format_elapsed(TimeDelta::seconds(-5)), "00:00:00");
    }

    #[test]
    fn price_change_message_layout() {
        let text = format_alert(&Alert::Move(move_alert(MoveKind::PriceChange, 5.0)));

        assert_eq!(
            text,
            "🚀 BTC/IDR (5.00%)\n\
             Harga : Rp.1,050,000,000\n\
             Harga sebelumnya : Rp.1,000,000,000\n\
             Volume : Rp.12,345,678,901\n\
             (Volume trades : Rp.-600,000,000)\n\
             Naik dalam kurun waktu : 03:05:09"
        );
    }

    #[test]
    fn pump_dump_message_has_banner_and_annotations() {
        let mut m = move_alert(MoveKind::PumpDump(Severity::Big), -60.0);
        m.rank = Some(RankLabel::Low(2));
        m.under_maintenance = true;

        let text = format_alert(&Alert::Move(m));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "⚠ BIG DUMP ALERT ⚠");
        assert_eq!(lines[1], "🔻 BTC/IDR (-60.00%)");
        assert_eq!(lines[6], "DUMP dalam waktu: 03:05:09");
        assert_eq!(lines[7], "Peringkat 24 jam : Low #2");
        assert_eq!(lines[8], "🛠 Wallet sedang maintenance");
    }

    #[test]
    fn maintenance_messages() {
        let start = format_alert(&Alert::Maintenance(MaintenanceAlert::Started {
            asset: "eth".into(),
        }));
        let end = format_alert(&Alert::Maintenance(MaintenanceAlert::Ended {
            asset: "eth".into(),
            duration: TimeDelta::minutes(90),
        }));

        assert_eq!(start, "🛠 ETH/IDR wallet maintenance dimulai");
        assert_eq!(end, "✅ ETH/IDR wallet maintenance selesai\nDurasi : 01:30:00");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("a<b> & c"), "a&lt;b&gt; &amp; c");
    }
}
