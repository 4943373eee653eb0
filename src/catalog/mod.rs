//! Canned example programs offered by the example selector.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub name: &'static str,
    pub code: &'static str,
}

/// Fixed order; the first entry is the default program.
pub const EXAMPLES: &[Example] = &[
    Example {
        name: "Hello World",
        code: r#"nya("Hello, World!")"#,
    },
    Example {
        name: "Fibonacci",
        code: r#"meow fib(n int) int {
    sniff (n <= 1) {
        bring n
    }
    bring fib(n - 1) + fib(n - 2)
}

purr i (0..10) {
    nya(fib(i))
}"#,
    },
    Example {
        name: "FizzBuzz",
        code: r#"purr i (1..20) {
    sniff (i % 15 == 0) {
        nya("FizzBuzz")
    } scratch {
        sniff (i % 3 == 0) {
            nya("Fizz")
        } scratch {
            sniff (i % 5 == 0) {
                nya("Buzz")
            } scratch {
                nya(i)
            }
        }
    }
}"#,
    },
    Example {
        name: "List Operations",
        code: r#"nyan xs = [1, 2, 3, 4, 5]
nya("Original:", xs)

nyan doubled = lick(xs, paw(x int) { x * 2 })
nya("Doubled:", doubled)

nyan evens = picky(xs, paw(x int) { x % 2 == 0 })
nya("Evens:", evens)

nyan sum = curl(xs, 0, paw(acc int, x int) { acc + x })
nya("Sum:", sum)

# Pipe operator
nyan result = xs |=| picky(paw(x int) { x > 2 }) |=| lick(paw(x int) { x * 10 })
nya("Piped:", result)"#,
    },
    Example {
        name: "Kitty & Groom",
        code: r#"kitty Nyantyu {
    name: string
    age: int
}

groom Nyantyu {
    meow greet() string {
        bring "Meow! I am " + self.name
    }

    meow is_kitten() bool {
        bring self.age < 2
    }
}

nyan tama = Nyantyu("Tama", 3)
nyan chibi = Nyantyu("Chibi", 1)

nya(tama.greet())
nya(chibi.greet())
nya("Tama is kitten:", tama.is_kitten())
nya("Chibi is kitten:", chibi.is_kitten())"#,
    },
    Example {
        name: "Pattern Matching",
        code: r#"meow classify(n int) string {
    bring peek(n) {
        0 => "zero"
        1..9 => "single digit"
        10..99 => "double digit"
        _ => "big number"
    }
}

purr i (0..5) {
    nyan n = i * 25
    nya(n, "is", classify(n))
}"#,
    },
    Example {
        name: "Error Handling",
        code: r#"# gag catches errors and returns Furball
nyan result = gag(paw() { hiss("something broke") })
nya("Result:", result)
nya("Is error?", is_furball(result))

# ~> operator provides fallback
nyan safe = hiss("oops") ~> 42
nya("Safe value:", safe)

# ~> with function fallback
nyan handled = hiss("fail") ~> paw(err string) { "recovered" }
nya("Handled:", handled)"#,
    },
    Example {
        name: "Collar (Newtype)",
        code: r#"collar UserId = int
collar Email = string

nyan id = UserId(42)
nyan email = Email("tama@meow.cat")

nya("User ID:", id.value)
nya("Email:", email.value)"#,
    },
];

pub fn default_example() -> &'static Example {
    &EXAMPLES[0]
}

pub fn find(name: &str) -> Option<&'static Example> {
    EXAMPLES.iter().find(|ex| ex.name == name)
}

/// Case-insensitive lookup used by the command line.
pub fn find_loose(name: &str) -> Option<&'static Example> {
    let wanted = name.trim();
    find(wanted).or_else(|| EXAMPLES.iter().find(|ex| ex.name.eq_ignore_ascii_case(wanted)))
}

/// Selection control over [`EXAMPLES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleSelector {
    selected: usize,
}

impl ExampleSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &'static Example {
        &EXAMPLES[self.selected]
    }

    pub fn index(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, name: &str) -> Option<&'static Example> {
        let idx = EXAMPLES.iter().position(|ex| ex.name == name)?;
        self.selected = idx;
        Some(self.current())
    }

    pub fn select_index(&mut self, idx: usize) -> Option<&'static Example> {
        if idx >= EXAMPLES.len() {
            return None;
        }
        self.selected = idx;
        Some(self.current())
    }

    pub fn next(&mut self) -> &'static Example {
        self.selected = (self.selected + 1) % EXAMPLES.len();
        self.current()
    }

    pub fn prev(&mut self) -> &'static Example {
        self.selected = (self.selected + EXAMPLES.len() - 1) % EXAMPLES.len();
        self.current()
    }
}
