//! Minimal XLSX writer: one worksheet, one inline-string cell per row

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Report" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// DOS date for 1980-01-01, the earliest a ZIP entry can carry
const ZIP_EPOCH_DATE: u16 = (1 << 5) | 1;

/// Write `lines` into column A of a single-sheet workbook
pub fn write_workbook(lines: &[String]) -> Vec<u8> {
    let mut zip = StoredZip::default();
    zip.add("[Content_Types].xml", CONTENT_TYPES.as_bytes());
    zip.add("_rels/.rels", ROOT_RELS.as_bytes());
    zip.add("xl/workbook.xml", WORKBOOK.as_bytes());
    zip.add("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes());
    zip.add("xl/worksheets/sheet1.xml", worksheet(lines).as_bytes());
    zip.finish()
}

fn worksheet(lines: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (i, line) in lines.iter().enumerate() {
        let row = i + 1;
        xml.push_str(&format!(
            r#"<row r="{row}"><c r="A{row}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c></row>"#,
            escape_xml(line)
        ));
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// ZIP archive with uncompressed entries
#[derive(Default)]
struct StoredZip {
    out: Vec<u8>,
    central: Vec<u8>,
    entries: u16,
}

impl StoredZip {
    fn add(&mut self, name: &str, data: &[u8]) {
        let offset = self.out.len() as u32;
        let crc = crc32fast::hash(data);
        let size = data.len() as u32;
        let name_len = name.len() as u16;

        // Local file header
        put_u32(&mut self.out, 0x0403_4b50);
        put_u16(&mut self.out, 20);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, ZIP_EPOCH_DATE);
        put_u32(&mut self.out, crc);
        put_u32(&mut self.out, size);
        put_u32(&mut self.out, size);
        put_u16(&mut self.out, name_len);
        put_u16(&mut self.out, 0);
        self.out.extend_from_slice(name.as_bytes());
        self.out.extend_from_slice(data);

        // Central directory record
        put_u32(&mut self.central, 0x0201_4b50);
        put_u16(&mut self.central, 20);
        put_u16(&mut self.central, 20);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, ZIP_EPOCH_DATE);
        put_u32(&mut self.central, crc);
        put_u32(&mut self.central, size);
        put_u32(&mut self.central, size);
        put_u16(&mut self.central, name_len);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u16(&mut self.central, 0);
        put_u32(&mut self.central, 0);
        put_u32(&mut self.central, offset);
        self.central.extend_from_slice(name.as_bytes());

        self.entries += 1;
    }

    fn finish(mut self) -> Vec<u8> {
        let central_offset = self.out.len() as u32;
        let central_size = self.central.len() as u32;
        self.out.append(&mut self.central);

        // End of central directory
        put_u32(&mut self.out, 0x0605_4b50);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, self.entries);
        put_u16(&mut self.out, self.entries);
        put_u32(&mut self.out, central_size);
        put_u32(&mut self.out, central_offset);
        put_u16(&mut self.out, 0);
        self.out
    }
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn test_workbook_is_a_zip_package() {
        let xlsx = write_workbook(&["Total: 3".to_string()]);
        assert_eq!(&xlsx[..4], b"PK\x03\x04");

        let eocd = xlsx.len() - 22;
        assert_eq!(read_u32(&xlsx, eocd), 0x0605_4b50);
        assert_eq!(read_u16(&xlsx, eocd + 10), 5);

        let central_size = read_u32(&xlsx, eocd + 12) as usize;
        let central_offset = read_u32(&xlsx, eocd + 16) as usize;
        assert_eq!(central_offset + central_size, eocd);
        assert_eq!(read_u32(&xlsx, central_offset), 0x0201_4b50);
    }

    #[test]
    fn test_entries_carry_valid_checksums() {
        let xlsx = write_workbook(&["a".to_string(), "b".to_string()]);

        // Walk the local headers
        let mut at = 0;
        let mut names = Vec::new();
        while read_u32(&xlsx, at) == 0x0403_4b50 {
            let crc = read_u32(&xlsx, at + 14);
            let size = read_u32(&xlsx, at + 18) as usize;
            let name_len = read_u16(&xlsx, at + 26) as usize;
            let name_start = at + 30;
            let data_start = name_start + name_len;
            names.push(String::from_utf8(xlsx[name_start..data_start].to_vec()).unwrap());
            assert_eq!(crc32fast::hash(&xlsx[data_start..data_start + size]), crc);
            at = data_start + size;
        }

        assert_eq!(names.len(), 5);
        assert!(names.contains(&"xl/worksheets/sheet1.xml".to_string()));
    }

    #[test]
    fn test_worksheet_rows() {
        let xml = worksheet(&["first".to_string(), "a < b & c".to_string()]);
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">first</t>"#));
        assert!(xml.contains("a &lt; b &amp; c"));
        assert!(xml.contains(r#"<row r="2">"#));
    }
}
