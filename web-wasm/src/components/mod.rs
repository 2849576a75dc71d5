pub mod category_section;
pub mod checklist_item;
pub mod export_buttons;
pub mod header;
pub mod image_upload;
pub mod product_table;
pub mod product_type_manager;
pub mod signature_pad;
