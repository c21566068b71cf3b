//! Spreadsheet export, one row per record.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use xhs_core::NoteRecord;

use super::PersistError;

/// Excel's per-cell character limit.
const MAX_CELL_CHARS: usize = 32_767;

const HEADERS: [&str; 19] = [
    "note_id",
    "note_url",
    "note_type",
    "title",
    "desc",
    "user_id",
    "nickname",
    "avatar",
    "home_url",
    "liked_count",
    "collected_count",
    "comment_count",
    "share_count",
    "tags",
    "image_list",
    "video_cover",
    "video_addr",
    "upload_time",
    "ip_location",
];

pub(super) fn write_table(path: &Path, records: &[NoteRecord]) -> Result<(), PersistError> {
    build_workbook(records)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| PersistError::Xlsx {
            path: path.to_path_buf(),
            source,
        })
}

fn build_workbook(records: &[NoteRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("notes")?;

    let bold = Format::new().set_bold();
    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string_with_format(0, col, header, &bold)?;
    }

    for (row, record) in (1u32..).zip(records) {
        write_row(sheet, row, record)?;
    }
    Ok(workbook)
}

fn write_row(sheet: &mut Worksheet, row: u32, record: &NoteRecord) -> Result<(), XlsxError> {
    let text_cells: [(u16, String); 9] = [
        (0, record.note_id.clone()),
        (1, record.note_url.clone()),
        (2, record.note_type.to_string()),
        (3, record.title.clone()),
        (4, record.desc.clone()),
        (5, record.user_id.clone()),
        (6, record.nickname.clone()),
        (7, record.avatar.clone().unwrap_or_default()),
        (8, record.home_url.clone()),
    ];
    for (col, value) in text_cells {
        sheet.write_string(row, col, cell_text(&value))?;
    }

    let counts = [
        record.liked_count,
        record.collected_count,
        record.comment_count,
        record.share_count,
    ];
    for (col, count) in (9u16..).zip(counts) {
        #[allow(clippy::cast_precision_loss)]
        let value = count as f64;
        sheet.write_number(row, col, value)?;
    }

    let trailing: [(u16, String); 6] = [
        (13, record.tags.join(",")),
        (14, record.image_list.join("\n")),
        (15, record.video_cover.clone().unwrap_or_default()),
        (16, record.video_addr.clone().unwrap_or_default()),
        (17, record.upload_time.clone().unwrap_or_default()),
        (18, record.ip_location.clone().unwrap_or_default()),
    ];
    for (col, value) in trailing {
        sheet.write_string(row, col, cell_text(&value))?;
    }
    Ok(())
}

fn cell_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}
