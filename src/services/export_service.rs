use crate::error::Result;
use crate::models::performance::RankingRow;
use crate::models::quiz::QuizResultRow;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::*;

pub struct ExportService;

const HEADER_BG: Color = Color::RGB(0x0F172A);
const ALT_ROW: Color = Color::RGB(0xF8FAFC);
const SCORE_GOOD: Color = Color::RGB(0x10B981);
const SCORE_MID: Color = Color::RGB(0xF59E0B);
const SCORE_LOW: Color = Color::RGB(0xEF4444);

impl ExportService {
    /// Generate a styled XLSX workbook from a quiz's result rows.
    pub fn quiz_results_xlsx(title: &str, rows: &[QuizResultRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Results")?;

        let columns = [
            ("№", 8.0),
            ("Roll No", 12.0),
            ("Student", 28.0),
            ("Question", 50.0),
            ("Status", 14.0),
            ("Answer", 40.0),
            ("Score", 10.0),
            ("Submitted At", 22.0),
        ];
        write_header(worksheet, title, &columns)?;

        let body = body_formats();
        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 2;
            let format = if i % 2 == 0 { &body.alt } else { &body.plain };
            worksheet.write_number_with_format(r, 0, (i + 1) as f64, format)?;
            worksheet.write_string_with_format(r, 1, &row.student_roll_no, format)?;
            worksheet.write_string_with_format(r, 2, &row.student_name, format)?;
            worksheet.write_string_with_format(r, 3, &row.question_text, format)?;
            let status = if row.is_completed { "Completed" } else { "Pending" };
            worksheet.write_string_with_format(r, 4, status, format)?;
            worksheet.write_string_with_format(r, 5, row.answer.as_deref().unwrap_or("—"), format)?;
            match row.score.as_ref().and_then(|s| s.to_f64()) {
                Some(score) => worksheet.write_number_with_format(r, 6, score, format)?,
                None => worksheet.write_string_with_format(r, 6, "—", format)?,
            };
            let submitted = row
                .submitted_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "—".to_string());
            worksheet.write_string_with_format(r, 7, &submitted, format)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a styled XLSX workbook from a quiz's ranking rows, coloring
    /// the percentage column by band.
    pub fn rankings_xlsx(title: &str, rows: &[RankingRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Rankings")?;

        let columns = [
            ("Rank", 8.0),
            ("Roll No", 12.0),
            ("Student", 28.0),
            ("Score", 10.0),
            ("Max Score", 12.0),
            ("Percent", 10.0),
            ("Percentile", 12.0),
        ];
        write_header(worksheet, title, &columns)?;

        let body = body_formats();
        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 2;
            let format = if i % 2 == 0 { &body.alt } else { &body.plain };
            match row.rank {
                Some(rank) => worksheet.write_number_with_format(r, 0, rank as f64, format)?,
                None => worksheet.write_string_with_format(r, 0, "—", format)?,
            };
            worksheet.write_string_with_format(
                r,
                1,
                row.student_roll_no.as_deref().unwrap_or("—"),
                format,
            )?;
            worksheet.write_string_with_format(
                r,
                2,
                row.student_name.as_deref().unwrap_or("—"),
                format,
            )?;
            let score = row.total_score.to_f64().unwrap_or(0.0);
            let max = row.max_possible_score.to_f64().unwrap_or(0.0);
            worksheet.write_number_with_format(r, 3, score, format)?;
            worksheet.write_number_with_format(r, 4, max, format)?;
            let percent = if max > 0.0 { score / max * 100.0 } else { 0.0 };
            let percent_format = Format::new()
                .set_font_color(percent_color(percent))
                .set_bold();
            worksheet.write_number_with_format(r, 5, (percent * 10.0).round() / 10.0, &percent_format)?;
            match row.percentile.as_ref().and_then(|p| p.to_f64()) {
                Some(p) => worksheet.write_number_with_format(r, 6, p, format)?,
                None => worksheet.write_string_with_format(r, 6, "—", format)?,
            };
        }

        Ok(workbook.save_to_buffer()?)
    }
}

struct BodyFormats {
    plain: Format,
    alt: Format,
}

fn body_formats() -> BodyFormats {
    BodyFormats {
        plain: Format::new().set_text_wrap(),
        alt: Format::new().set_text_wrap().set_background_color(ALT_ROW),
    }
}

fn percent_color(percent: f64) -> Color {
    if percent >= 70.0 {
        SCORE_GOOD
    } else if percent >= 40.0 {
        SCORE_MID
    } else {
        SCORE_LOW
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    title: &str,
    columns: &[(&str, f64)],
) -> Result<()> {
    for (i, (_, width)) in columns.iter().enumerate() {
        worksheet.set_column_width(i as u16, *width)?;
    }

    let title_format = Format::new()
        .set_font_size(14)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_BG)
        .set_align(FormatAlign::VerticalCenter);
    worksheet.merge_range(0, 0, 0, columns.len() as u16 - 1, title, &title_format)?;
    worksheet.set_row_height(0, 24)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_BG);
    for (i, (name, _)) in columns.iter().enumerate() {
        worksheet.write_string_with_format(1, i as u16, *name, &header_format)?;
    }
    Ok(())
}
