//! User-facing strings (Arabic) and message templates.

use crate::domain::{NewTicket, TicketId};

pub const WELCOME: &str = "مرحباً. هذا بوت دعم مشاكل تسجيل الدخول في تطبيق HEPIQ.\nاختر من القائمة:";
pub const FAQ: &str = "تعليمات سريعة:\n\
- لا ترسل كلمة المرور.\n\
- اكتب وصف المشكلة بدقة.\n\
- إن أمكن أرسل لقطة شاشة لرسالة الخطأ.\n\
للإنشاء: اختر (طلب جديد).";
pub const CANCELLED: &str = "تم إلغاء العملية.";
pub const STALE_CHOICE: &str = "انتهت صلاحية هذا الاختيار. اختر من القائمة:";
pub const INTERNAL_ERROR: &str = "حدث خطأ داخلي أثناء معالجة طلبك. الرجاء المحاولة لاحقاً.";

pub const MENU_NEW_TICKET: &str = "طلب جديد";
pub const MENU_FAQ: &str = "تعليمات سريعة";

pub const ASK_FULLNAME: &str = "اكتب الاسم الثلاثي (إلزامي):";
pub const INVALID_FULLNAME: &str = "الرجاء إدخال الاسم الثلاثي (ثلاث كلمات على الأقل).";
pub const ASK_DEPARTMENT: &str = "اختر القسم:";
pub const INVALID_DEPARTMENT: &str = "اختر القسم من الأزرار.";
pub const DEPARTMENT_NOT_CONFIGURED: &str = "تنبيه إداري: لم يتم ضبط معرف مسؤول هذا القسم بعد.\n\
الرجاء إبلاغ الإدارة لضبط Chat ID لمسؤول القسم.";
pub const ASK_STAGE: &str = "اختر المرحلة:";
pub const INVALID_STAGE: &str = "اختر المرحلة من الأزرار.";
pub const ASK_STUDY_TYPE: &str = "اختر نوع الدراسة:";
pub const INVALID_STUDY_TYPE: &str = "اختر نوع الدراسة من الأزرار.";
pub const ASK_DESCRIPTION: &str =
    "اكتب وصف المشكلة (مثال: تظهر رسالة خطأ / لا يصل OTP / كلمة المرور مرفوضة...):";
pub const INVALID_DESCRIPTION: &str = "الرجاء كتابة وصف أوضح (10 أحرف على الأقل).";
pub const ASK_PHOTO_CHOICE: &str = "هل تريد إرسال لقطة شاشة؟";
pub const INVALID_PHOTO_CHOICE: &str = "اختر من الأزرار.";
pub const ASK_PHOTO: &str = "أرسل الصورة الآن (لقطة شاشة).";
pub const INVALID_PHOTO: &str = "الرجاء إرسال صورة (لقطة شاشة) أو اختر (تخطي) من القائمة.";
pub const PHOTO_ATTACH: &str = "إرسال لقطة شاشة";
pub const PHOTO_SKIP: &str = "تخطي";

pub const ADMIN_ASSIGN: &str = "استلام";
pub const ADMIN_ASK_MORE: &str = "طلب معلومات إضافية";
pub const ADMIN_RESOLVE: &str = "تم الحل";

pub const REJECT_NOT_ADMIN: &str = "هذا الإجراء مخصص لمسؤولي الأقسام فقط.";
pub const REJECT_MALFORMED: &str = "صيغة أمر غير صحيحة.";
pub const REJECT_NOT_FOUND: &str = "التذكرة غير موجودة.";
pub const REJECT_OTHER_DEPARTMENT: &str = "هذه التذكرة ليست ضمن قسمك.";

pub const STUDENT_ASSIGNED: &str = "تم استلام طلبك من مسؤول القسم، وسيتم العمل على الحل.";
pub const ADMIN_QUESTION_SENT: &str = "تم إرسال الطلب للطالب.";
pub const ADMIN_SOLUTION_SENT: &str = "تم إرسال الحل للطالب وإغلاق التذكرة.";

pub fn stage_label(n: u8) -> String {
    format!("المرحلة {n}")
}

pub fn my_id(chat_id: i64) -> String {
    format!("Chat ID الخاص بك هو: {chat_id}")
}

pub fn ticket_filed(id: TicketId) -> String {
    format!("تم استلام طلبك بنجاح.\nرقم التذكرة: #{id}\nسيتم التواصل معك برسالة خاصة عبر هذا البوت.")
}

pub fn admin_summary(id: TicketId, ticket: &NewTicket) -> String {
    format!(
        "طلب دعم جديد (HEPIQ)\n\
         تذكرة: #{}\n\
         الاسم الثلاثي: {}\n\
         القسم: {}\n\
         المرحلة: {}\n\
         نوع الدراسة: {}\n\
         وصف المشكلة:\n{}",
        id,
        ticket.student_fullname,
        ticket.department.label(),
        ticket.stage.get(),
        ticket.study_type.label(),
        ticket.description,
    )
}

pub fn admin_assigned(id: TicketId) -> String {
    format!("تم استلام التذكرة #{id}.")
}

pub fn admin_ask_prompt(id: TicketId) -> String {
    format!("اكتب الآن رسالة (السؤال/المطلوب) لإرسالها للطالب بخصوص التذكرة #{id}:")
}

pub fn admin_resolve_prompt(id: TicketId) -> String {
    format!("اكتب الآن نص الحل لإرساله للطالب وإغلاق التذكرة #{id}:")
}

pub fn student_more_info(id: TicketId, text: &str) -> String {
    format!("طلب معلومات إضافية بخصوص تذكرتك #{id}:\n{text}\n\nالرجاء الرد هنا على نفس البوت.")
}

pub fn student_resolved(id: TicketId, text: &str) -> String {
    format!("تم حل تذكرتك #{id}.\nتفاصيل الحل:\n{text}")
}
