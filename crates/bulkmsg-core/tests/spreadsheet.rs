#![cfg(feature = "xlsx")]

use bulkmsg_core::{
    decode_workbook, ByteContent, Cell, EngineRequest, MessageType, StarterKind, TemplateEngine,
    TemplateSource,
};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, XlsxError};

fn request() -> EngineRequest {
    EngineRequest {
        sender: "02-123-4567".to_string(),
        ..EngineRequest::default()
    }
}

fn order_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let stamp = Format::new().set_num_format("yyyy-mm-dd hh:mm");

    // Only A2 is filled, so the used range starts on the second row.
    let template = workbook.add_worksheet();
    template.set_name("자동메시지")?;
    template.write_string(1, 0, "{{이름}}님 {{주문일자}} 주문 {{주문금액}}원 확인 바랍니다")?;

    let data = workbook.add_worksheet();
    data.set_name("data")?;
    for (column, header) in (0u16..).zip(["발송여부", "휴대폰번호", "이름", "주문일자", "주문금액"]) {
        data.write_string(0, column, header)?;
    }
    let rows = [
        (true, "010-1234-5678", "홍길동", 50000.0),
        (false, "010-9876-5432", "김철수", 1200.0),
    ];
    for (row, (checked, phone, name, amount)) in (1u32..).zip(rows) {
        data.write_boolean(row, 0, checked)?;
        data.write_string(row, 1, phone)?;
        data.write_string(row, 2, name)?;
        data.write_datetime_with_format(row, 3, &ExcelDateTime::from_ymd(2025, 3, 22)?, &stamp)?;
        data.write_number(row, 4, amount)?;
    }

    workbook.save_to_buffer()
}

#[test]
fn xlsx_cells_keep_their_positions_and_types() {
    let bytes = order_workbook().unwrap();
    let workbook = decode_workbook(&ByteContent::new(bytes, None)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["자동메시지", "data"]);

    let template = workbook.sheet("자동메시지").unwrap();
    assert!(template.cell(0, 0).map_or(true, Cell::is_empty));
    assert!(template.cell(1, 0).is_some_and(|cell| !cell.is_empty()));

    let data = workbook.sheet("data").unwrap();
    assert_eq!(data.cell(1, 0), Some(&Cell::Bool(true)));
    assert_eq!(data.cell(1, 4), Some(&Cell::Number(50000.0)));
    assert!(matches!(data.cell(1, 3), Some(Cell::DateTime(_))));
}

#[test]
fn xlsx_order_sheet_fills_template_from_a2() {
    let bytes = order_workbook().unwrap();
    let content = ByteContent::new(bytes, Some("orders.xlsx".to_string()));
    let batch = TemplateEngine::default().generate(&content, &request()).unwrap();

    assert_eq!(batch.data_sheet, "data");
    assert_eq!(
        batch.template.source,
        TemplateSource::Cell {
            sheet: "자동메시지".to_string()
        }
    );
    assert_eq!(batch.total, 1);
    assert_eq!(batch.filtered_out, 1);
    let record = &batch.recipients[0];
    assert_eq!(record.to, "01012345678");
    assert_eq!(record.from, "021234567");
    assert_eq!(record.text, "홍길동님 2025-03-22 주문 50,000원 확인 바랍니다");
    assert_eq!(record.message_type, MessageType::Sms);
}

#[test]
fn auto_starter_workbook_generates_checked_rows() {
    let bytes = StarterKind::Auto.render().unwrap();
    let content = ByteContent::new(bytes, Some(StarterKind::Auto.file_name().to_string()));
    let batch = TemplateEngine::default().generate(&content, &request()).unwrap();

    assert_eq!(batch.data_sheet, "data");
    assert_eq!(batch.total, 2);
    let text = &batch.recipients[0].text;
    assert!(text.starts_with("[자동화 메시지 템플릿]\r\n안녕하세요 홍길동님,"), "{text}");
    assert!(text.contains("◎ 주문일자: 2025-03-22"), "{text}");
    assert!(text.contains("◎ 주문금액: 50,000원"), "{text}");
    assert_eq!(batch.recipients[1].to, "01098765432");
}
