use crate::atom::Chirality;
use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond { bond: BondToken, pos: usize },
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

/// One atom as written, before any graph context is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    /// `None` is the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: Chirality,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: Option<u16>,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
    Up,
    Down,
}

/// Split the input into tokens, recording recoverable errors as they are
/// found. Unrecognized characters and malformed brackets are skipped so the
/// rest of the string still tokenizes.
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<SmilesError>) {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '[' => match parse_bracket_atom(&chars, i) {
                Ok((tok, next)) => {
                    tokens.push(Token::Atom(tok));
                    i = next;
                }
                Err(e) => {
                    errors.push(e);
                    // skip past the bracket so later tokens survive
                    i = chars[i..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|off| i + off + 1)
                        .unwrap_or(chars.len());
                }
            },
            'B' => {
                if chars.get(i + 1) == Some(&'r') {
                    tokens.push(Token::Atom(bare_atom(Element::Br, false, i)));
                    i += 2;
                } else {
                    tokens.push(Token::Atom(bare_atom(Element::B, false, i)));
                    i += 1;
                }
            }
            'C' => {
                if chars.get(i + 1) == Some(&'l') {
                    tokens.push(Token::Atom(bare_atom(Element::Cl, false, i)));
                    i += 2;
                } else {
                    tokens.push(Token::Atom(bare_atom(Element::C, false, i)));
                    i += 1;
                }
            }
            'N' => {
                tokens.push(Token::Atom(bare_atom(Element::N, false, i)));
                i += 1;
            }
            'O' => {
                tokens.push(Token::Atom(bare_atom(Element::O, false, i)));
                i += 1;
            }
            'P' => {
                tokens.push(Token::Atom(bare_atom(Element::P, false, i)));
                i += 1;
            }
            'S' => {
                tokens.push(Token::Atom(bare_atom(Element::S, false, i)));
                i += 1;
            }
            'F' => {
                tokens.push(Token::Atom(bare_atom(Element::F, false, i)));
                i += 1;
            }
            'I' => {
                tokens.push(Token::Atom(bare_atom(Element::I, false, i)));
                i += 1;
            }
            'b' => {
                tokens.push(Token::Atom(bare_atom(Element::B, true, i)));
                i += 1;
            }
            'c' => {
                tokens.push(Token::Atom(bare_atom(Element::C, true, i)));
                i += 1;
            }
            'n' => {
                tokens.push(Token::Atom(bare_atom(Element::N, true, i)));
                i += 1;
            }
            'o' => {
                tokens.push(Token::Atom(bare_atom(Element::O, true, i)));
                i += 1;
            }
            'p' => {
                tokens.push(Token::Atom(bare_atom(Element::P, true, i)));
                i += 1;
            }
            's' => {
                tokens.push(Token::Atom(bare_atom(Element::S, true, i)));
                i += 1;
            }
            '*' => {
                tokens.push(Token::Atom(AtomToken {
                    element: None,
                    is_aromatic: false,
                    isotope: 0,
                    chirality: Chirality::None,
                    hcount: None,
                    charge: 0,
                    atom_class: None,
                    is_bracket: false,
                    pos: i,
                }));
                i += 1;
            }
            '-' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Single,
                    pos: i,
                });
                i += 1;
            }
            '=' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Double,
                    pos: i,
                });
                i += 1;
            }
            '#' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Triple,
                    pos: i,
                });
                i += 1;
            }
            '$' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Quadruple,
                    pos: i,
                });
                i += 1;
            }
            ':' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Aromatic,
                    pos: i,
                });
                i += 1;
            }
            '/' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Up,
                    pos: i,
                });
                i += 1;
            }
            '\\' => {
                tokens.push(Token::Bond {
                    bond: BondToken::Down,
                    pos: i,
                });
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
                    && chars.get(i + 2).is_some_and(|c| c.is_ascii_digit())
                {
                    let d1 = chars[i + 1] as u16 - b'0' as u16;
                    let d2 = chars[i + 2] as u16 - b'0' as u16;
                    tokens.push(Token::RingClosure {
                        digit: d1 * 10 + d2,
                        pos: i,
                    });
                    i += 3;
                } else {
                    errors.push(SmilesError::BadRingNumber { pos: i });
                    i += 1;
                }
            }
            d @ '0'..='9' => {
                tokens.push(Token::RingClosure {
                    digit: d as u16 - b'0' as u16,
                    pos: i,
                });
                i += 1;
            }
            ch => {
                errors.push(SmilesError::UnexpectedChar { pos: i, ch });
                i += 1;
            }
        }
    }

    (tokens, errors)
}

fn bare_atom(element: Element, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element: Some(element),
        is_aromatic: aromatic,
        isotope: 0,
        chirality: Chirality::None,
        hcount: None,
        charge: 0,
        atom_class: None,
        is_bracket: false,
        pos,
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1; // skip '['

    let isotope = parse_digits_u16(chars, &mut i);

    let element_start = i;
    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;

    let chirality = parse_chirality(chars, &mut i)?;

    let hcount = parse_hcount(chars, &mut i);

    let charge = parse_charge(chars, &mut i, start)?;

    let atom_class = if i < chars.len() && chars[i] == ':' {
        i += 1;
        match parse_digits_u16(chars, &mut i) {
            Some(v) => Some(v),
            None => return Err(SmilesError::UnexpectedChar { pos: i, ch: ':' }),
        }
    } else {
        None
    };

    if i >= chars.len() {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    if chars[i] != ']' {
        if chars[i].is_ascii_alphabetic() {
            // leftover letters mean the symbol itself was bogus ([CX], [Xq])
            let text: String = chars[element_start..]
                .iter()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();
            return Err(SmilesError::UnknownElement {
                pos: element_start,
                text,
            });
        }
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1; // skip ']'

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope: isotope.unwrap_or(0),
            chirality,
            hcount: Some(hcount.unwrap_or(0)),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i,
    ))
}

fn parse_digits_u16(chars: &[char], i: &mut usize) -> Option<u16> {
    let mut val: u16 = 0;
    let mut found = false;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        found = true;
        val = val
            .saturating_mul(10)
            .saturating_add(chars[*i] as u16 - b'0' as u16);
        *i += 1;
    }
    found.then_some(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Option<Element>, bool), SmilesError> {
    if *i >= chars.len() {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    }

    if chars[*i] == '*' {
        *i += 1;
        return Ok((None, false));
    }

    let aromatic_map: &[(&str, Element)] = &[
        ("se", Element::Se),
        ("as", Element::As),
        ("b", Element::B),
        ("c", Element::C),
        ("n", Element::N),
        ("o", Element::O),
        ("p", Element::P),
        ("s", Element::S),
    ];

    for &(pat, elem) in aromatic_map {
        if *i + pat.len() <= chars.len() {
            let slice: String = chars[*i..*i + pat.len()].iter().collect();
            if slice == pat {
                let after = *i + pat.len();
                let next_is_lower = after < chars.len() && chars[after].is_ascii_lowercase();
                if !next_is_lower || pat.len() == 2 {
                    *i += pat.len();
                    return Ok((Some(elem), true));
                }
            }
        }
    }

    // Try two-char uppercase element first, then one-char
    if *i + 1 < chars.len() && chars[*i].is_ascii_uppercase() && chars[*i + 1].is_ascii_lowercase()
    {
        let sym: String = chars[*i..=*i + 1].iter().collect();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 2;
            return Ok((Some(e), false));
        }
    }

    if chars[*i].is_ascii_uppercase() {
        let sym: String = chars[*i..=*i].iter().collect();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 1;
            return Ok((Some(e), false));
        }
    }

    let text: String = chars[*i..]
        .iter()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    Err(SmilesError::UnknownElement {
        pos: *i,
        text: if text.is_empty() {
            chars[*i].to_string()
        } else {
            text
        },
    })
}

fn parse_chirality(chars: &[char], i: &mut usize) -> Result<Chirality, SmilesError> {
    if *i >= chars.len() || chars[*i] != '@' {
        return Ok(Chirality::None);
    }
    let tag_start = *i;
    *i += 1;

    if *i < chars.len() && chars[*i] == '@' {
        *i += 1;
        return Ok(Chirality::Cw);
    }

    // two-letter class code followed by digits, e.g. @TH1, @TB12, @OH26
    if *i + 2 <= chars.len() {
        let code: String = chars[*i..*i + 2].iter().collect();
        let max = match code.as_str() {
            "TH" => Some(2u8),
            "AL" => Some(2),
            "SP" => Some(3),
            "TB" => Some(20),
            "OH" => Some(30),
            _ => None,
        };
        if let Some(max) = max {
            if chars.get(*i + 2).is_some_and(|c| c.is_ascii_digit()) {
                *i += 2;
                let mut val: u8 = 0;
                while *i < chars.len() && chars[*i].is_ascii_digit() {
                    val = val
                        .saturating_mul(10)
                        .saturating_add(chars[*i] as u8 - b'0');
                    *i += 1;
                }
                if val == 0 || val > max {
                    let text: String = chars[tag_start..*i].iter().collect();
                    return Err(SmilesError::InvalidChirality {
                        pos: tag_start,
                        text,
                    });
                }
                return Ok(match code.as_str() {
                    "TH" => Chirality::Th(val),
                    "AL" => Chirality::Al(val),
                    "SP" => Chirality::Sp(val),
                    "TB" => Chirality::Tb(val),
                    _ => Chirality::Oh(val),
                });
            }
        }
    }

    Ok(Chirality::Ccw)
}

fn parse_hcount(chars: &[char], i: &mut usize) -> Option<u8> {
    if *i < chars.len() && chars[*i] == 'H' {
        *i += 1;
        let mut count: u8 = 1;
        if *i < chars.len() && chars[*i].is_ascii_digit() {
            count = chars[*i] as u8 - b'0';
            *i += 1;
        }
        Some(count)
    } else {
        None
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    if *i >= chars.len() {
        return Ok(0);
    }

    match chars[*i] {
        '+' => {
            *i += 1;
            if *i < chars.len() && chars[*i] == '+' {
                let mut count: i8 = 1;
                while *i < chars.len() && chars[*i] == '+' {
                    count = count
                        .checked_add(1)
                        .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
                    *i += 1;
                }
                Ok(count)
            } else if *i < chars.len() && chars[*i].is_ascii_digit() {
                let mut val: i8 = 0;
                while *i < chars.len() && chars[*i].is_ascii_digit() {
                    val = val
                        .checked_mul(10)
                        .and_then(|v| v.checked_add((chars[*i] as i8) - b'0' as i8))
                        .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
                    *i += 1;
                }
                Ok(val)
            } else {
                Ok(1)
            }
        }
        '-' => {
            *i += 1;
            if *i < chars.len() && chars[*i] == '-' {
                let mut count: i8 = -1;
                while *i < chars.len() && chars[*i] == '-' {
                    count = count
                        .checked_sub(1)
                        .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
                    *i += 1;
                }
                Ok(count)
            } else if *i < chars.len() && chars[*i].is_ascii_digit() {
                let mut val: i8 = 0;
                while *i < chars.len() && chars[*i].is_ascii_digit() {
                    val = val
                        .checked_mul(10)
                        .and_then(|v| v.checked_add((chars[*i] as i8) - b'0' as i8))
                        .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
                    *i += 1;
                }
                Ok(-val)
            } else {
                Ok(-1)
            }
        }
        _ => Ok(0),
    }
}
