use crate::error::{CoreError, Result};
use serde::Serialize;
use std::fmt;

pub const AUTO_DATA_SHEET: &str = "data";

pub const AUTO_TEMPLATE_HINT: &str =
    "★ 아래 셀(A2)에 메시지 템플릿을 작성하세요. {{변수명}}으로 치환 가능합니다.";

pub const AUTO_TEMPLATE_TEXT: &str = "[자동화 메시지 템플릿]\n안녕하세요 {{이름}}님,\n주문해주신 상품이 발송되었습니다.\n◎ 주문일자: {{주문일자}}\n◎ 주문금액: {{주문금액}}원\n\n감사합니다.";

pub const AUTO_HEADERS: [&str; 6] =
    ["발송여부", "휴대폰번호", "이름", "주문일자", "주문금액", "주문상품"];

const BULK_HEADERS: [&str; 2] = ["이름", "휴대폰번호"];
const BULK_ROWS: [[&str; 2]; 2] = [["홍길동", "010-1234-1234"], ["전우치", "010-1234-1234"]];

/// Files users download, fill in and upload again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StarterKind {
    /// Two-column recipient list for direct sends.
    Bulk,
    /// Workbook with a template sheet and an order data sheet.
    Auto,
}

impl StarterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StarterKind::Bulk => "bulk",
            StarterKind::Auto => "auto",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            StarterKind::Bulk => "sample_template.csv",
            StarterKind::Auto => "automation_template.xlsx",
        }
    }

    pub fn render(self) -> Result<Vec<u8>> {
        match self {
            StarterKind::Bulk => bulk_starter_csv(),
            StarterKind::Auto => auto_starter_workbook(),
        }
    }
}

impl fmt::Display for StarterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn bulk_starter_csv() -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BULK_HEADERS).map_err(encode_error)?;
    for row in BULK_ROWS {
        writer.write_record(row).map_err(encode_error)?;
    }
    writer.into_inner().map_err(encode_error)
}

fn encode_error(err: impl fmt::Display) -> CoreError {
    CoreError::Encode(err.to_string())
}

#[cfg(feature = "xlsx")]
pub fn auto_starter_workbook() -> Result<Vec<u8>> {
    imp::auto_starter_workbook()
}

#[cfg(not(feature = "xlsx"))]
pub fn auto_starter_workbook() -> Result<Vec<u8>> {
    Err(CoreError::UnsupportedFileType(
        "spreadsheet support is not enabled".to_string(),
    ))
}

#[cfg(feature = "xlsx")]
mod imp {
    use super::{
        encode_error, AUTO_DATA_SHEET, AUTO_HEADERS, AUTO_TEMPLATE_HINT, AUTO_TEMPLATE_TEXT,
    };
    use crate::error::Result;
    use crate::rules::DEFAULT_TEMPLATE_SHEETS;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    /// (checked, phone, name, (y, m, d), amount, product)
    type SampleOrder = (bool, &'static str, &'static str, (u16, u8, u8), f64, &'static str);

    const AUTO_ROWS: [SampleOrder; 3] = [
        (true, "01012345678", "홍길동", (2025, 3, 22), 50000.0, "스마트폰 케이스"),
        (true, "01098765432", "김철수", (2025, 3, 22), 35000.0, "블루투스 이어폰"),
        (false, "01011112222", "이영희", (2025, 3, 23), 15000.0, "보조배터리"),
    ];

    const COLUMN_WIDTH: f64 = 15.0;
    const TEMPLATE_WIDTH: f64 = 60.0;

    pub(super) fn auto_starter_workbook() -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let wrap = Format::new().set_text_wrap();
        let date = Format::new().set_num_format("yyyy-mm-dd");
        let amount = Format::new().set_num_format("#,##0");

        let template = workbook.add_worksheet();
        template
            .set_name(DEFAULT_TEMPLATE_SHEETS[0])
            .map_err(encode_error)?;
        template
            .set_column_width(0, TEMPLATE_WIDTH)
            .map_err(encode_error)?;
        template
            .write_string(0, 0, AUTO_TEMPLATE_HINT)
            .map_err(encode_error)?;
        template
            .write_string_with_format(1, 0, AUTO_TEMPLATE_TEXT, &wrap)
            .map_err(encode_error)?;

        let data = workbook.add_worksheet();
        data.set_name(AUTO_DATA_SHEET).map_err(encode_error)?;
        for (column, header) in (0u16..).zip(AUTO_HEADERS) {
            data.write_string(0, column, header).map_err(encode_error)?;
            data.set_column_width(column, COLUMN_WIDTH)
                .map_err(encode_error)?;
        }
        for (row, (checked, phone, name, (year, month, day), price, product)) in
            (1u32..).zip(AUTO_ROWS)
        {
            let ordered = ExcelDateTime::from_ymd(year, month, day).map_err(encode_error)?;
            data.write_boolean(row, 0, checked).map_err(encode_error)?;
            data.write_string(row, 1, phone).map_err(encode_error)?;
            data.write_string(row, 2, name).map_err(encode_error)?;
            data.write_datetime_with_format(row, 3, &ordered, &date)
                .map_err(encode_error)?;
            data.write_number_with_format(row, 4, price, &amount)
                .map_err(encode_error)?;
            data.write_string(row, 5, product).map_err(encode_error)?;
        }

        workbook.save_to_buffer().map_err(encode_error)
    }
}
