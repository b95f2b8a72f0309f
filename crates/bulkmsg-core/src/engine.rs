use crate::domain::{normalize_sender, Field, MessageRecord, MessageType};
use crate::dto::{EngineResponse, PreviewEntry};
use crate::error::{EngineError, NoEligibleReason};
use crate::rules::{
    extract_template, format_message, select_rows, substitute, template_variables, FieldMap,
    Template, TemplateLookup, DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_SHEETS,
};
use crate::table::{decode_workbook, ByteContent, Table, Workbook};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const DEFAULT_DATA_SHEETS: [&str; 7] =
    ["data", "Data", "데이터", "Sheet1", "발송", "발송목록", "data-sheet"];
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;
pub const DEFAULT_LMS_THRESHOLD: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub template_sheets: Vec<String>,
    pub data_sheets: Vec<String>,
    pub default_template: String,
    pub preview_limit: usize,
    /// Messages longer than this many characters go out as LMS.
    pub lms_threshold: usize,
    /// Subject for LMS/MMS rows that have no subject column value.
    pub subject: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            template_sheets: DEFAULT_TEMPLATE_SHEETS.map(String::from).to_vec(),
            data_sheets: DEFAULT_DATA_SHEETS.map(String::from).to_vec(),
            default_template: DEFAULT_TEMPLATE.to_string(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            lms_threshold: DEFAULT_LMS_THRESHOLD,
            subject: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineRequest {
    /// Overrides any template found in the workbook.
    pub template: Option<String>,
    pub sender: String,
    pub image_id: Option<String>,
    /// Keep only the first `preview_limit` records in `recipients`.
    pub preview_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedBatch {
    /// Every eligible row, even when `recipients` was cut for a preview.
    pub total: usize,
    pub recipients: Vec<MessageRecord>,
    pub preview: Vec<PreviewEntry>,
    pub template: Template,
    pub data_sheet: String,
    pub fields: FieldMap,
    pub skipped_invalid_phone: usize,
    pub filtered_out: usize,
}

impl GeneratedBatch {
    pub fn summary(&self) -> String {
        let mut message = format!("{} messages generated", self.total);
        if self.skipped_invalid_phone > 0 {
            message.push_str(&format!(
                ", {} rows skipped for invalid phone numbers",
                self.skipped_invalid_phone
            ));
        }
        message
    }

    pub fn into_response(self) -> EngineResponse {
        let message = self.summary();
        EngineResponse {
            success: true,
            total: Some(self.total),
            recipients: Some(self.recipients),
            preview: Some(self.preview),
            message,
            skipped_invalid_phone: Some(self.skipped_invalid_phone),
            filtered_out: Some(self.filtered_out),
        }
    }
}

/// Turns an uploaded table plus a template into per-recipient messages.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    options: EngineOptions,
}

impl TemplateEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Never fails: errors come back as `success: false` with a message.
    pub fn run(&self, content: &ByteContent, request: &EngineRequest) -> EngineResponse {
        match self.generate(content, request) {
            Ok(batch) => batch.into_response(),
            Err(err) => {
                warn!("message generation failed: {err}");
                EngineResponse::failure(err.to_string())
            }
        }
    }

    pub fn generate(
        &self,
        content: &ByteContent,
        request: &EngineRequest,
    ) -> Result<GeneratedBatch, EngineError> {
        if normalize_sender(&request.sender).is_empty() {
            return Err(EngineError::MissingSender);
        }
        let workbook = decode_workbook(content)?;
        self.generate_from_workbook(&workbook, request)
    }

    pub fn generate_from_workbook(
        &self,
        workbook: &Workbook,
        request: &EngineRequest,
    ) -> Result<GeneratedBatch, EngineError> {
        let sender = normalize_sender(&request.sender);
        if sender.is_empty() {
            return Err(EngineError::MissingSender);
        }

        let sheet =
            workbook.data_sheet(&self.options.data_sheets, &self.options.template_sheets)?;
        let table = Table::from_sheet(sheet);
        if table.is_empty() {
            return Err(EngineError::NoEligibleRows(NoEligibleReason::EmptyTable));
        }

        let fields = FieldMap::resolve(&table.columns);
        for (field, column) in fields.iter() {
            debug!(%field, column, "resolved column");
        }
        let phone_column = fields
            .column(Field::Phone)
            .ok_or(EngineError::MissingPhoneColumn)?;

        let template = extract_template(
            workbook,
            &TemplateLookup {
                literal: request.template.as_deref(),
                sheets: &self.options.template_sheets,
                default_text: &self.options.default_template,
                data_sheet: Some(sheet.name.as_str()),
            },
        );
        debug!(source = ?template.source, "using template");
        warn_unmapped_variables(&template.text, &fields, &table.columns);

        let selection = select_rows(&fields, phone_column, &table.rows);
        if fields.contains(Field::SendFlag) && selection.selected() == 0 {
            return Err(EngineError::NoEligibleRows(NoEligibleReason::NoneSelected));
        }
        if selection.eligible.is_empty() {
            return Err(EngineError::NoEligibleRows(NoEligibleReason::NoValidPhone));
        }

        let image_id = request
            .image_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let limit = self.options.preview_limit;
        let mut recipients = Vec::with_capacity(selection.eligible.len());
        let mut preview = Vec::with_capacity(limit.min(selection.eligible.len()));

        for eligible in &selection.eligible {
            let row_template = fields
                .value(Field::Message, eligible.row)
                .unwrap_or_else(|| template.text.clone());
            let text = substitute(&row_template, eligible.row, &fields);
            let message_type =
                MessageType::infer(&text, image_id.is_some(), self.options.lms_threshold);
            let subject = fields
                .value(Field::Subject, eligible.row)
                .or_else(|| self.options.subject.clone())
                .filter(|_| message_type.allows_subject());

            if preview.len() < limit {
                preview.push(PreviewEntry {
                    index: recipients.len() + 1,
                    phone: eligible.phone.clone(),
                    text: text.clone(),
                    name: fields.value(Field::Name, eligible.row),
                });
            }
            recipients.push(MessageRecord {
                to: eligible.phone.clone(),
                from: sender.clone(),
                text: format_message(&text),
                message_type,
                image_id: image_id.map(str::to_string),
                subject,
            });
        }

        let total = recipients.len();
        if request.preview_only {
            recipients.truncate(limit);
        }
        info!(
            total,
            sheet = %sheet.name,
            skipped_invalid_phone = selection.skipped_invalid_phone,
            filtered_out = selection.filtered_out,
            "generated messages"
        );

        Ok(GeneratedBatch {
            total,
            recipients,
            preview,
            template,
            data_sheet: sheet.name.clone(),
            fields,
            skipped_invalid_phone: selection.skipped_invalid_phone,
            filtered_out: selection.filtered_out,
        })
    }
}

fn warn_unmapped_variables(template: &str, fields: &FieldMap, columns: &[String]) {
    for name in template_variables(template) {
        let Some(field) = Field::from_variable(&name) else {
            continue;
        };
        if !fields.contains(field) && !columns.contains(&name) {
            warn!(variable = %name, %field, "no column found for template variable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineOptions, EngineRequest, TemplateEngine};
    use crate::domain::MessageType;
    use crate::error::{EngineError, NoEligibleReason};
    use crate::table::{Cell, Sheet, Workbook};

    fn request(template: Option<&str>) -> EngineRequest {
        EngineRequest {
            template: template.map(str::to_string),
            sender: "010-9999-0000".to_string(),
            ..EngineRequest::default()
        }
    }

    fn sheet(rows: Vec<Vec<&str>>) -> Workbook {
        Workbook::single(Sheet::new(
            "Sheet1",
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::text).collect())
                .collect(),
        ))
    }

    #[test]
    fn sender_is_required() {
        let workbook = sheet(vec![vec!["휴대폰번호"], vec!["01012345678"]]);
        let mut req = request(Some("hi"));
        req.sender = " - ".to_string();
        let err = TemplateEngine::default()
            .generate_from_workbook(&workbook, &req)
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingSender));
    }

    #[test]
    fn header_only_sheets_are_not_data_sheets() {
        let workbook = Workbook::new(vec![
            Sheet::new("data", vec![vec![Cell::text("휴대폰번호")]]),
            Sheet::new(
                "Sheet1",
                vec![vec![Cell::text("휴대폰번호")], vec![Cell::text("01012345678")]],
            ),
        ]);
        let batch = TemplateEngine::default()
            .generate_from_workbook(&workbook, &request(Some("hi")))
            .unwrap();
        assert_eq!(batch.data_sheet, "Sheet1");
    }

    #[test]
    fn custom_data_sheet_wins_over_template_sheet() {
        let workbook = Workbook::new(vec![
            Sheet::new(
                "자동메시지",
                vec![
                    vec![Cell::text("A2에 템플릿을 작성하세요")],
                    vec![Cell::text("{{이름}}님 주문 확인 바랍니다")],
                ],
            ),
            Sheet::new(
                "주문목록",
                vec![
                    vec![Cell::text("이름"), Cell::text("휴대폰번호")],
                    vec![Cell::text("홍길동"), Cell::text("01012345678")],
                ],
            ),
        ]);
        let batch = TemplateEngine::default()
            .generate_from_workbook(&workbook, &request(None))
            .unwrap();
        assert_eq!(batch.data_sheet, "주문목록");
        assert_eq!(batch.recipients[0].text, "홍길동님 주문 확인 바랍니다");
    }

    #[test]
    fn unchecked_send_flags_are_reported() {
        let workbook = sheet(vec![
            vec!["", "휴대폰번호"],
            vec!["FALSE", "01012345678"],
        ]);
        let err = TemplateEngine::default()
            .generate_from_workbook(&workbook, &request(Some("hi")))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoEligibleRows(NoEligibleReason::NoneSelected)
        ));
    }

    #[test]
    fn long_messages_become_lms_with_configured_subject() {
        let workbook = sheet(vec![vec!["휴대폰번호"], vec!["01012345678"]]);
        let engine = TemplateEngine::new(EngineOptions {
            lms_threshold: 10,
            subject: Some("주문 안내".to_string()),
            ..EngineOptions::default()
        });
        let batch = engine
            .generate_from_workbook(&workbook, &request(Some("열 글자를 넘는 안내 메시지입니다")))
            .unwrap();
        let record = &batch.recipients[0];
        assert_eq!(record.message_type, MessageType::Lms);
        assert_eq!(record.subject.as_deref(), Some("주문 안내"));
    }

    #[test]
    fn short_messages_drop_subject() {
        let workbook = sheet(vec![vec!["휴대폰번호", "제목"], vec!["01012345678", "알림"]]);
        let batch = TemplateEngine::default()
            .generate_from_workbook(&workbook, &request(Some("짧은 안내")))
            .unwrap();
        assert_eq!(batch.recipients[0].message_type, MessageType::Sms);
        assert_eq!(batch.recipients[0].subject, None);
    }

    #[test]
    fn image_id_forces_mms_for_every_record() {
        let workbook = sheet(vec![
            vec!["휴대폰번호"],
            vec!["01012345678"],
            vec!["01087654321"],
        ]);
        let mut req = request(Some("짧은 안내"));
        req.image_id = Some("ST01FZ".to_string());
        let batch = TemplateEngine::default()
            .generate_from_workbook(&workbook, &req)
            .unwrap();
        assert!(batch
            .recipients
            .iter()
            .all(|record| record.message_type == MessageType::Mms
                && record.image_id.as_deref() == Some("ST01FZ")));
    }

    #[test]
    fn per_row_message_column_overrides_template() {
        let workbook = sheet(vec![
            vec!["이름", "휴대폰번호", "메시지"],
            vec!["김철수", "01012345678", "{{이름}}님 전용 안내"],
            vec!["이영희", "01087654321", ""],
        ]);
        let batch = TemplateEngine::default()
            .generate_from_workbook(&workbook, &request(Some("{{이름}}님 공통 안내")))
            .unwrap();
        assert_eq!(batch.preview[0].text, "김철수님 전용 안내");
        assert_eq!(batch.preview[1].text, "이영희님 공통 안내");
    }
}
