//! User-facing copy. The survey portal ships in Vietnamese only.

pub const ROUTE_NOT_FOUND: &str =
    "Link khảo sát không hợp lệ. Vui lòng sử dụng link được gửi qua email.";
pub const INVALID_LINK: &str = "Link không hợp lệ. Thiếu mã khảo sát hoặc token.";
pub const INVALID_LINK_HINT: &str = "Vui lòng sử dụng đúng link được gửi qua email.";

pub const LOADING: &str = "Đang tải khảo sát...";
pub const LOAD_FAILED_TITLE: &str = "Không thể tải khảo sát";
pub const LOAD_FAILED_FALLBACK: &str = "Link không hợp lệ hoặc khảo sát đã kết thúc.";
pub const SAVE_FAILED_FALLBACK: &str = "Có lỗi khi lưu. Vui lòng thử lại.";

pub const THANK_YOU_TITLE: &str = "Cảm ơn bạn đã hoàn thành khảo sát";
pub const THANK_YOU_BODY: &str = "Câu trả lời của bạn đã được ghi nhận.";

pub const REQUIRED_HINT: &str = "Vui lòng trả lời đầy đủ các câu hỏi bắt buộc (có dấu *).";
pub const TEXT_PLACEHOLDER: &str = "Nhập câu trả lời";
pub const EMAIL_PLACEHOLDER: &str = "email@example.com";
pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";
pub const NUMBER_INVALID: &str = "Vui lòng nhập một số hợp lệ.";

pub const SAVE_DRAFT: &str = "Lưu nháp";
pub const SAVING_DRAFT: &str = "Đang lưu...";
pub const SUBMIT: &str = "Gửi hoàn thành";
pub const SUBMITTING: &str = "Đang gửi...";
pub const DRAFT_SAVED: &str = "Đã lưu nháp.";

pub const WINDOW_TITLE: &str = "Khảo sát";
pub const LINK_PROMPT: &str = "Dán link khảo sát được gửi qua email";
pub const OPEN_LINK: &str = "Mở";
pub const RETRY: &str = "Thử lại";
pub const DISMISS: &str = "Đóng";
pub const BACKEND_UNAVAILABLE: &str = "Không kết nối được tới máy chủ khảo sát. Vui lòng thử lại.";
