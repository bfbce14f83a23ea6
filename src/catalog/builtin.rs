// Builtin group roster used by the basic quiz.

/// (key, display name, members) for every builtin group, in menu order.
pub const BUILTIN_GROUPS: &[(&str, &str, &[&str])] = &[
    (
        "twice",
        "Twice",
        &[
            "Momo", "Jihyo", "Nayeon", "Sana", "Dahyun", "Jeongyeon", "Mina", "Chaeyoung", "Tzuyu",
        ],
    ),
    ("illit", "ILLIT", &["Yunah", "Minju", "Wonhee", "Moka", "Iroha"]),
    ("i-dle", "I-dle", &["Soyeon", "Minnie", "Miyeon", "Shuhua", "Yuqi"]),
    (
        "all day project",
        "All Day Project",
        &["Youngseo", "Annie", "Bailey", "Tarzzan", "Woochan"],
    ),
    (
        "le sserafim",
        "Le Sserafim",
        &["Chaewon", "Sakura", "Kazuha", "Eunchae", "Yunjin"],
    ),
    (
        "katseye",
        "Katseye",
        &["Lara", "Megan", "Sophia", "Yoonchae", "Manon", "Daniela"],
    ),
    ("itzy", "Itzy", &["Yeji", "Ryujin", "Chaeryeong", "Lia", "Yuna"]),
    ("red velvet", "Red Velvet", &["Joy", "Seulgi", "Yeri", "Irene", "Wendy"]),
    ("njz", "NJZ", &["Minji", "Hanni", "Danielle", "Haerin", "Hyein"]),
    ("blackpink", "BLACKPINK", &["Lisa", "Jisoo", "Jennie", "Rose"]),
    ("aespa", "Aespa", &["Giselle", "Winter", "Ningning", "Karina"]),
    (
        "baby monster",
        "Baby Monster",
        &["Ruka", "Pharita", "Chiquita", "Rami", "Asa", "Ahyeon", "Rora"],
    ),
    ("kiss of life", "Kiss of Life", &["Natty", "Julie", "Haneul", "Belle"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_keys_unique_and_normalized() {
        let keys: HashSet<_> = BUILTIN_GROUPS.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(keys.len(), BUILTIN_GROUPS.len());
        for (key, _, _) in BUILTIN_GROUPS {
            assert_eq!(*key, crate::catalog::norm_group_key(key));
        }
    }

    #[test]
    fn test_builtin_members_unique_within_group() {
        for (key, _, members) in BUILTIN_GROUPS {
            let unique: HashSet<_> = members.iter().collect();
            assert_eq!(unique.len(), members.len(), "duplicate member in {key}");
        }
    }
}
