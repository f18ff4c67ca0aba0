//! Character classes accepted by the scanner.

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic()
}

pub fn is_tag_name_char(c: char) -> bool {
    c.is_alphabetic()
}

pub fn is_attribute_name_char(c: char) -> bool {
    c.is_alphabetic()
}
