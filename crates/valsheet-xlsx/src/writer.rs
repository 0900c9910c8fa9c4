//! XLSX writer
//!
//! Writes a model grid as a single-sheet Office Open XML workbook: the
//! package parts are assembled by hand since the grid only ever needs
//! inline strings, numbers, formulas and the four model number formats.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use valsheet_core::{column_to_letters, CellValue, Grid, Style};

/// Custom number-format IDs start above the built-in range.
const FIRST_CUSTOM_FMT_ID: u32 = 164;

/// The styles that carry a number format, in cellXfs order (xf 0 is the
/// default format-less style).
const FORMATTED_STYLES: [Style; 4] = [Style::Comma, Style::Percent, Style::Ratio, Style::Ratio2];

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a grid to a file path
    pub fn write_file<P: AsRef<Path>>(grid: &Grid, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(grid, file)
    }

    /// Write a grid to a writer
    pub fn write<W: Write + Seek>(grid: &Grid, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(WORKBOOK_XML.as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS.as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml(grid).as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::sheet_xml(grid).as_bytes())?;

        zip.finish()?;
        Ok(())
    }

    /// The cellXfs index for a style (0 is the unformatted default)
    fn xf_id(style: Style) -> u32 {
        FORMATTED_STYLES
            .iter()
            .position(|&s| s == style)
            .map(|i| i as u32 + 1)
            .unwrap_or(0)
    }

    fn styles_xml(grid: &Grid) -> String {
        let font = grid.font();

        let mut num_fmts = String::new();
        for (i, style) in FORMATTED_STYLES.iter().enumerate() {
            let code = style.format_code().unwrap_or("General");
            num_fmts.push_str(&format!(
                "\n        <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                FIRST_CUSTOM_FMT_ID + i as u32,
                escape_xml(code)
            ));
        }

        let mut cell_xfs = String::from(
            "\n        <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/>",
        );
        for i in 0..FORMATTED_STYLES.len() as u32 {
            cell_xfs.push_str(&format!(
                "\n        <xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" applyNumberFormat=\"1\"/>",
                FIRST_CUSTOM_FMT_ID + i
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <numFmts count="{num_fmt_count}">{num_fmts}
    </numFmts>
    <fonts count="1">
        <font><sz val="{font_size}"/><name val="{font_name}"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="{xf_count}">{cell_xfs}
    </cellXfs>
</styleSheet>"#,
            num_fmt_count = FORMATTED_STYLES.len(),
            num_fmts = num_fmts,
            font_size = font.size,
            font_name = escape_xml(&font.name),
            xf_count = FORMATTED_STYLES.len() + 1,
            cell_xfs = cell_xfs,
        )
    }

    fn sheet_xml(grid: &Grid) -> String {
        let layout = grid.layout();

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        // Wide label column, uniform data columns through the terminal year.
        content.push_str(&format!(
            "\n    <cols>\n        <col min=\"{label}\" max=\"{label}\" width=\"32\" customWidth=\"1\"/>\n        <col min=\"{start}\" max=\"{end}\" width=\"11\" customWidth=\"1\"/>\n    </cols>",
            label = layout.label_column,
            start = layout.start_column,
            end = layout.terminal_column(),
        ));

        content.push_str("\n    <sheetData>");

        let mut current_row: Option<u32> = None;
        for (row, col, cell) in grid.iter_cells() {
            if current_row != Some(row) {
                if current_row.is_some() {
                    content.push_str("\n        </row>");
                }
                content.push_str(&format!("\n        <row r=\"{}\">", row));
                current_row = Some(row);
            }

            let cell_ref = format!("{}{}", column_to_letters(col), row);
            let xf_id = Self::xf_id(cell.style);
            let style_attr = if xf_id != 0 {
                format!(" s=\"{}\"", xf_id)
            } else {
                String::new()
            };

            match &cell.value {
                CellValue::Number(n) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{}><v>{}</v></c>",
                        cell_ref, style_attr, n
                    ));
                }
                CellValue::Text(s) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t>{}</t></is></c>",
                        cell_ref,
                        style_attr,
                        escape_xml(s)
                    ));
                }
                CellValue::Formula(text) => {
                    let formula_text = text.strip_prefix('=').unwrap_or(text);
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{}><f>{}</f></c>",
                        cell_ref,
                        style_attr,
                        escape_xml(formula_text)
                    ));
                }
                CellValue::Blank => {
                    // Style-only cells keep their number format.
                    if xf_id != 0 {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"{}/>",
                            cell_ref, style_attr
                        ));
                    }
                }
            }
        }

        if current_row.is_some() {
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");
        content
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="sheet 1" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use valsheet_core::SheetLayout;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new("nvda", SheetLayout::default());
        grid.put(3, 2, CellValue::Number(100.0), Style::Comma).unwrap();
        grid.put(3, 3, CellValue::Formula("=B3*2".into()), Style::Comma)
            .unwrap();
        grid.put(4, 2, CellValue::Number(0.15), Style::Percent).unwrap();
        grid
    }

    #[test]
    fn test_sheet_xml_cell_kinds() {
        let xml = XlsxWriter::sheet_xml(&sample_grid());

        // Inline string for the ticker, number and formula cells below.
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t>NVDA</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B3" s="1"><v>100</v></c>"#));
        assert!(xml.contains(r#"<c r="C3" s="1"><f>B3*2</f></c>"#));
        assert!(xml.contains(r#"<c r="B4" s="2"><v>0.15</v></c>"#));
    }

    #[test]
    fn test_sheet_xml_rows_in_order() {
        let xml = XlsxWriter::sheet_xml(&sample_grid());
        let r1 = xml.find(r#"<row r="1">"#).unwrap();
        let r3 = xml.find(r#"<row r="3">"#).unwrap();
        let r4 = xml.find(r#"<row r="4">"#).unwrap();
        assert!(r1 < r3 && r3 < r4);
    }

    #[test]
    fn test_styles_xml_number_formats() {
        let xml = XlsxWriter::styles_xml(&sample_grid());
        assert!(xml.contains(r##"<numFmt numFmtId="164" formatCode="#,0.00"/>"##));
        assert!(xml.contains(r#"<numFmt numFmtId="165" formatCode="0.00%"/>"#));
        assert!(xml.contains(r#"<numFmt numFmtId="166" formatCode="0.0000"/>"#));
        assert!(xml.contains(r#"<numFmt numFmtId="167" formatCode="0.00"/>"#));
        assert!(xml.contains(r#"<name val="Calibri"/>"#));
    }

    #[test]
    fn test_write_produces_a_zip_with_all_parts() {
        let grid = sample_grid();
        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write(&grid, &mut buffer).unwrap();

        let mut archive = zip::ZipArchive::new(buffer).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {}", part);
        }
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.xlsx");
        XlsxWriter::write_file(&sample_grid(), &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
