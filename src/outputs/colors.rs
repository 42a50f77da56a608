//! Per-author display colours.
//!
//! Colours are handed out by position in the user list, cycling through the
//! CSS named colours in alphabetical order. Authors that only show up in the
//! data (a reloaded CSV, or a page author that differs from the user id) take
//! the next free slots in order of first appearance.

use std::collections::HashMap;

/// A CSS named colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

impl NamedColor {
    const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self { name, rgb: (r, g, b) }
    }
}

/// The 148 CSS Color Module Level 4 named colours, sorted by name.
pub const CSS4_COLORS: [NamedColor; 148] = [
    NamedColor::new("aliceblue", 0xF0, 0xF8, 0xFF),
    NamedColor::new("antiquewhite", 0xFA, 0xEB, 0xD7),
    NamedColor::new("aqua", 0x00, 0xFF, 0xFF),
    NamedColor::new("aquamarine", 0x7F, 0xFF, 0xD4),
    NamedColor::new("azure", 0xF0, 0xFF, 0xFF),
    NamedColor::new("beige", 0xF5, 0xF5, 0xDC),
    NamedColor::new("bisque", 0xFF, 0xE4, 0xC4),
    NamedColor::new("black", 0x00, 0x00, 0x00),
    NamedColor::new("blanchedalmond", 0xFF, 0xEB, 0xCD),
    NamedColor::new("blue", 0x00, 0x00, 0xFF),
    NamedColor::new("blueviolet", 0x8A, 0x2B, 0xE2),
    NamedColor::new("brown", 0xA5, 0x2A, 0x2A),
    NamedColor::new("burlywood", 0xDE, 0xB8, 0x87),
    NamedColor::new("cadetblue", 0x5F, 0x9E, 0xA0),
    NamedColor::new("chartreuse", 0x7F, 0xFF, 0x00),
    NamedColor::new("chocolate", 0xD2, 0x69, 0x1E),
    NamedColor::new("coral", 0xFF, 0x7F, 0x50),
    NamedColor::new("cornflowerblue", 0x64, 0x95, 0xED),
    NamedColor::new("cornsilk", 0xFF, 0xF8, 0xDC),
    NamedColor::new("crimson", 0xDC, 0x14, 0x3C),
    NamedColor::new("cyan", 0x00, 0xFF, 0xFF),
    NamedColor::new("darkblue", 0x00, 0x00, 0x8B),
    NamedColor::new("darkcyan", 0x00, 0x8B, 0x8B),
    NamedColor::new("darkgoldenrod", 0xB8, 0x86, 0x0B),
    NamedColor::new("darkgray", 0xA9, 0xA9, 0xA9),
    NamedColor::new("darkgreen", 0x00, 0x64, 0x00),
    NamedColor::new("darkgrey", 0xA9, 0xA9, 0xA9),
    NamedColor::new("darkkhaki", 0xBD, 0xB7, 0x6B),
    NamedColor::new("darkmagenta", 0x8B, 0x00, 0x8B),
    NamedColor::new("darkolivegreen", 0x55, 0x6B, 0x2F),
    NamedColor::new("darkorange", 0xFF, 0x8C, 0x00),
    NamedColor::new("darkorchid", 0x99, 0x32, 0xCC),
    NamedColor::new("darkred", 0x8B, 0x00, 0x00),
    NamedColor::new("darksalmon", 0xE9, 0x96, 0x7A),
    NamedColor::new("darkseagreen", 0x8F, 0xBC, 0x8F),
    NamedColor::new("darkslateblue", 0x48, 0x3D, 0x8B),
    NamedColor::new("darkslategray", 0x2F, 0x4F, 0x4F),
    NamedColor::new("darkslategrey", 0x2F, 0x4F, 0x4F),
    NamedColor::new("darkturquoise", 0x00, 0xCE, 0xD1),
    NamedColor::new("darkviolet", 0x94, 0x00, 0xD3),
    NamedColor::new("deeppink", 0xFF, 0x14, 0x93),
    NamedColor::new("deepskyblue", 0x00, 0xBF, 0xFF),
    NamedColor::new("dimgray", 0x69, 0x69, 0x69),
    NamedColor::new("dimgrey", 0x69, 0x69, 0x69),
    NamedColor::new("dodgerblue", 0x1E, 0x90, 0xFF),
    NamedColor::new("firebrick", 0xB2, 0x22, 0x22),
    NamedColor::new("floralwhite", 0xFF, 0xFA, 0xF0),
    NamedColor::new("forestgreen", 0x22, 0x8B, 0x22),
    NamedColor::new("fuchsia", 0xFF, 0x00, 0xFF),
    NamedColor::new("gainsboro", 0xDC, 0xDC, 0xDC),
    NamedColor::new("ghostwhite", 0xF8, 0xF8, 0xFF),
    NamedColor::new("gold", 0xFF, 0xD7, 0x00),
    NamedColor::new("goldenrod", 0xDA, 0xA5, 0x20),
    NamedColor::new("gray", 0x80, 0x80, 0x80),
    NamedColor::new("green", 0x00, 0x80, 0x00),
    NamedColor::new("greenyellow", 0xAD, 0xFF, 0x2F),
    NamedColor::new("grey", 0x80, 0x80, 0x80),
    NamedColor::new("honeydew", 0xF0, 0xFF, 0xF0),
    NamedColor::new("hotpink", 0xFF, 0x69, 0xB4),
    NamedColor::new("indianred", 0xCD, 0x5C, 0x5C),
    NamedColor::new("indigo", 0x4B, 0x00, 0x82),
    NamedColor::new("ivory", 0xFF, 0xFF, 0xF0),
    NamedColor::new("khaki", 0xF0, 0xE6, 0x8C),
    NamedColor::new("lavender", 0xE6, 0xE6, 0xFA),
    NamedColor::new("lavenderblush", 0xFF, 0xF0, 0xF5),
    NamedColor::new("lawngreen", 0x7C, 0xFC, 0x00),
    NamedColor::new("lemonchiffon", 0xFF, 0xFA, 0xCD),
    NamedColor::new("lightblue", 0xAD, 0xD8, 0xE6),
    NamedColor::new("lightcoral", 0xF0, 0x80, 0x80),
    NamedColor::new("lightcyan", 0xE0, 0xFF, 0xFF),
    NamedColor::new("lightgoldenrodyellow", 0xFA, 0xFA, 0xD2),
    NamedColor::new("lightgray", 0xD3, 0xD3, 0xD3),
    NamedColor::new("lightgreen", 0x90, 0xEE, 0x90),
    NamedColor::new("lightgrey", 0xD3, 0xD3, 0xD3),
    NamedColor::new("lightpink", 0xFF, 0xB6, 0xC1),
    NamedColor::new("lightsalmon", 0xFF, 0xA0, 0x7A),
    NamedColor::new("lightseagreen", 0x20, 0xB2, 0xAA),
    NamedColor::new("lightskyblue", 0x87, 0xCE, 0xFA),
    NamedColor::new("lightslategray", 0x77, 0x88, 0x99),
    NamedColor::new("lightslategrey", 0x77, 0x88, 0x99),
    NamedColor::new("lightsteelblue", 0xB0, 0xC4, 0xDE),
    NamedColor::new("lightyellow", 0xFF, 0xFF, 0xE0),
    NamedColor::new("lime", 0x00, 0xFF, 0x00),
    NamedColor::new("limegreen", 0x32, 0xCD, 0x32),
    NamedColor::new("linen", 0xFA, 0xF0, 0xE6),
    NamedColor::new("magenta", 0xFF, 0x00, 0xFF),
    NamedColor::new("maroon", 0x80, 0x00, 0x00),
    NamedColor::new("mediumaquamarine", 0x66, 0xCD, 0xAA),
    NamedColor::new("mediumblue", 0x00, 0x00, 0xCD),
    NamedColor::new("mediumorchid", 0xBA, 0x55, 0xD3),
    NamedColor::new("mediumpurple", 0x93, 0x70, 0xDB),
    NamedColor::new("mediumseagreen", 0x3C, 0xB3, 0x71),
    NamedColor::new("mediumslateblue", 0x7B, 0x68, 0xEE),
    NamedColor::new("mediumspringgreen", 0x00, 0xFA, 0x9A),
    NamedColor::new("mediumturquoise", 0x48, 0xD1, 0xCC),
    NamedColor::new("mediumvioletred", 0xC7, 0x15, 0x85),
    NamedColor::new("midnightblue", 0x19, 0x19, 0x70),
    NamedColor::new("mintcream", 0xF5, 0xFF, 0xFA),
    NamedColor::new("mistyrose", 0xFF, 0xE4, 0xE1),
    NamedColor::new("moccasin", 0xFF, 0xE4, 0xB5),
    NamedColor::new("navajowhite", 0xFF, 0xDE, 0xAD),
    NamedColor::new("navy", 0x00, 0x00, 0x80),
    NamedColor::new("oldlace", 0xFD, 0xF5, 0xE6),
    NamedColor::new("olive", 0x80, 0x80, 0x00),
    NamedColor::new("olivedrab", 0x6B, 0x8E, 0x23),
    NamedColor::new("orange", 0xFF, 0xA5, 0x00),
    NamedColor::new("orangered", 0xFF, 0x45, 0x00),
    NamedColor::new("orchid", 0xDA, 0x70, 0xD6),
    NamedColor::new("palegoldenrod", 0xEE, 0xE8, 0xAA),
    NamedColor::new("palegreen", 0x98, 0xFB, 0x98),
    NamedColor::new("paleturquoise", 0xAF, 0xEE, 0xEE),
    NamedColor::new("palevioletred", 0xDB, 0x70, 0x93),
    NamedColor::new("papayawhip", 0xFF, 0xEF, 0xD5),
    NamedColor::new("peachpuff", 0xFF, 0xDA, 0xB9),
    NamedColor::new("peru", 0xCD, 0x85, 0x3F),
    NamedColor::new("pink", 0xFF, 0xC0, 0xCB),
    NamedColor::new("plum", 0xDD, 0xA0, 0xDD),
    NamedColor::new("powderblue", 0xB0, 0xE0, 0xE6),
    NamedColor::new("purple", 0x80, 0x00, 0x80),
    NamedColor::new("rebeccapurple", 0x66, 0x33, 0x99),
    NamedColor::new("red", 0xFF, 0x00, 0x00),
    NamedColor::new("rosybrown", 0xBC, 0x8F, 0x8F),
    NamedColor::new("royalblue", 0x41, 0x69, 0xE1),
    NamedColor::new("saddlebrown", 0x8B, 0x45, 0x13),
    NamedColor::new("salmon", 0xFA, 0x80, 0x72),
    NamedColor::new("sandybrown", 0xF4, 0xA4, 0x60),
    NamedColor::new("seagreen", 0x2E, 0x8B, 0x57),
    NamedColor::new("seashell", 0xFF, 0xF5, 0xEE),
    NamedColor::new("sienna", 0xA0, 0x52, 0x2D),
    NamedColor::new("silver", 0xC0, 0xC0, 0xC0),
    NamedColor::new("skyblue", 0x87, 0xCE, 0xEB),
    NamedColor::new("slateblue", 0x6A, 0x5A, 0xCD),
    NamedColor::new("slategray", 0x70, 0x80, 0x90),
    NamedColor::new("slategrey", 0x70, 0x80, 0x90),
    NamedColor::new("snow", 0xFF, 0xFA, 0xFA),
    NamedColor::new("springgreen", 0x00, 0xFF, 0x7F),
    NamedColor::new("steelblue", 0x46, 0x82, 0xB4),
    NamedColor::new("tan", 0xD2, 0xB4, 0x8C),
    NamedColor::new("teal", 0x00, 0x80, 0x80),
    NamedColor::new("thistle", 0xD8, 0xBF, 0xD8),
    NamedColor::new("tomato", 0xFF, 0x63, 0x47),
    NamedColor::new("turquoise", 0x40, 0xE0, 0xD0),
    NamedColor::new("violet", 0xEE, 0x82, 0xEE),
    NamedColor::new("wheat", 0xF5, 0xDE, 0xB3),
    NamedColor::new("white", 0xFF, 0xFF, 0xFF),
    NamedColor::new("whitesmoke", 0xF5, 0xF5, 0xF5),
    NamedColor::new("yellow", 0xFF, 0xFF, 0x00),
    NamedColor::new("yellowgreen", 0x9A, 0xCD, 0x32),
];

/// Author to colour mapping for one report.
#[derive(Debug, Clone, Default)]
pub struct ColorAssignment {
    slots: HashMap<String, usize>,
}

impl ColorAssignment {
    /// Assign colours to `users` by their position in the list.
    pub fn from_users<S: AsRef<str>>(users: &[S]) -> Self {
        let mut assignment = Self::default();
        assignment.extend(users.iter().map(AsRef::as_ref));
        assignment
    }

    /// Give every author not seen yet the next colour slot.
    pub fn extend<'a>(&mut self, authors: impl IntoIterator<Item = &'a str>) {
        for author in authors {
            let next = self.slots.len();
            self.slots.entry(author.to_string()).or_insert(next);
        }
    }

    pub fn get(&self, author: &str) -> Option<NamedColor> {
        self.slots
            .get(author)
            .map(|slot| CSS4_COLORS[slot % CSS4_COLORS.len()])
    }

    /// Colour for `author`, falling back to the first palette entry for
    /// authors that were never assigned.
    pub fn color_of(&self, author: &str) -> NamedColor {
        self.get(author).unwrap_or(CSS4_COLORS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_sorted_and_unique_by_name() {
        assert!(CSS4_COLORS.windows(2).all(|w| w[0].name < w[1].name));
        assert_eq!(CSS4_COLORS[0].name, "aliceblue");
        assert_eq!(CSS4_COLORS[147].name, "yellowgreen");
    }

    #[test]
    fn test_colours_follow_user_order() {
        let colors = ColorAssignment::from_users(&["carol", "alice", "bob"]);
        assert_eq!(colors.color_of("carol").name, "aliceblue");
        assert_eq!(colors.color_of("alice").name, "antiquewhite");
        assert_eq!(colors.color_of("bob").name, "aqua");
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let users = vec!["x".to_string(), "y".to_string()];
        let a = ColorAssignment::from_users(users.as_slice());
        let b = ColorAssignment::from_users(users.as_slice());
        assert_eq!(a.get("y"), b.get("y"));
    }

    #[test]
    fn test_palette_wraps_around() {
        let users: Vec<String> = (0..150).map(|i| format!("user{i}")).collect();
        let colors = ColorAssignment::from_users(users.as_slice());
        assert_eq!(colors.color_of("user148"), CSS4_COLORS[0]);
        assert_eq!(colors.color_of("user149"), CSS4_COLORS[1]);
    }

    #[test]
    fn test_extend_only_adds_new_authors() {
        let mut colors = ColorAssignment::from_users(&["alice"]);
        colors.extend(["alice", "zoe", "alice", "yan"]);
        assert_eq!(colors.color_of("alice").name, "aliceblue");
        assert_eq!(colors.color_of("zoe").name, "antiquewhite");
        assert_eq!(colors.color_of("yan").name, "aqua");
    }

    #[test]
    fn test_unknown_author_falls_back() {
        let colors = ColorAssignment::default();
        assert_eq!(colors.get("nobody"), None);
        assert_eq!(colors.color_of("nobody"), CSS4_COLORS[0]);
    }
}
