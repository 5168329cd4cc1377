//! C++ runtime shims emitted on demand into the generated source.

/// Console output. A function template so any streamable value works and
/// `print` stays usable in expression position.
pub(crate) const PRINT_SHIM: &str = r#"template <typename T>
void mica_print(const T& value) {
    std::cout << value << std::endl;
}
"#;

/// Line-based console input.
pub(crate) const INPUT_SHIM: &str = r#"inline std::string mica_input() {
    std::string line;
    std::getline(std::cin, line);
    return line;
}
"#;

/// Seconds since the epoch, for the `time` standard module.
pub(crate) const TIME_SHIM: &str = r#"inline long mica_time_now() {
    return static_cast<long>(std::time(nullptr));
}
"#;

/// Minimal ok/err carrier backing the `Result<T, E>` type.
pub(crate) const RESULT_SHIM: &str = r#"template <typename T, typename E>
struct MicaResult {
    bool is_ok;
    T value;
    E error;

    static MicaResult ok(T value) {
        return MicaResult{true, std::move(value), E{}};
    }
    static MicaResult err(E error) {
        return MicaResult{false, T{}, std::move(error)};
    }
};
"#;
